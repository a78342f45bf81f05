//! Integration coverage for instance type primitives and descriptors.

use instance_catalog_domain::{InstanceTypeDescriptor, InstanceTypeName, PrimitiveError};
use instance_catalog_shared::{ErrorCode, ErrorEnvelope};
use proptest::prelude::*;

#[test]
fn blank_names_map_into_error_envelopes() -> Result<(), PrimitiveError> {
    let Err(error) = InstanceTypeName::parse(" ") else {
        return Err(PrimitiveError::EmptyInstanceTypeName { input_length: 0 });
    };

    let envelope: ErrorEnvelope = error.into();
    assert_eq!(
        envelope.code,
        ErrorCode::new("domain", "invalid_instance_type_name")
    );
    assert_eq!(envelope.metadata.get("inputLength"), Some(&"1".to_string()));

    Ok(())
}

#[test]
fn descriptors_round_trip_through_json() -> Result<(), serde_json::Error> {
    let payload = r#"{"name":"m5.large","defaultVcpus":2,"memoryMib":8192,"currentGeneration":true}"#;
    let descriptor: InstanceTypeDescriptor = serde_json::from_str(payload)?;
    assert_eq!(descriptor.name(), "m5.large");
    assert_eq!(descriptor.default_vcpus, Some(2));
    assert_eq!(descriptor.memory_mib, Some(8192));
    assert_eq!(descriptor.current_generation, Some(true));

    assert_eq!(serde_json::to_string(&descriptor)?, payload);
    Ok(())
}

#[test]
fn descriptors_reject_blank_names() {
    let parsed = serde_json::from_str::<InstanceTypeDescriptor>(r#"{"name":"  "}"#);
    assert!(parsed.is_err());
}

proptest! {
    #[test]
    fn parsed_names_are_trimmed_and_stable(name in "[a-z][a-z0-9-]{0,6}\\.[a-z0-9]{1,10}", pad in 0usize..4) {
        let padded = format!("{}{name}{}", " ".repeat(pad), " ".repeat(pad));
        let parsed = InstanceTypeName::parse(&padded);
        prop_assert!(parsed.is_ok());
        if let Ok(parsed) = parsed {
            prop_assert_eq!(parsed.as_str(), name.as_str());
            prop_assert_eq!(InstanceTypeName::parse(parsed.as_str()), Ok(parsed.clone()));
        }
    }
}
