//! Tests for the typed ledger identifiers

use core_kernel::{CustomerId, InvoiceId, PaymentId, AllocationId, CoreError};
use uuid::Uuid;

mod customer_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        assert_ne!(CustomerId::new(), CustomerId::new());
    }

    #[test]
    fn test_ids_are_time_ordered_across_milliseconds() {
        let first = CustomerId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = CustomerId::new();
        assert!(first < second);
    }

    #[test]
    fn test_prefix_and_display() {
        assert_eq!(CustomerId::prefix(), "CUS");
        assert!(CustomerId::new().to_string().starts_with("CUS-"));
    }

    #[test]
    fn test_from_uuid_round_trip() {
        let uuid = Uuid::now_v7();
        let id = CustomerId::from_uuid(uuid);
        let back: Uuid = id.into();
        assert_eq!(uuid, back);
    }
}

mod parsing {
    use super::*;

    #[test]
    fn test_parse_with_prefix() {
        let id = InvoiceId::new();
        assert_eq!(id.to_string().parse::<InvoiceId>().unwrap(), id);
    }

    #[test]
    fn test_parse_without_prefix() {
        let id = PaymentId::new();
        assert_eq!(id.as_uuid().to_string().parse::<PaymentId>().unwrap(), id);
    }

    #[test]
    fn test_parse_garbage_fails() {
        let err = "INV-not-a-uuid".parse::<InvoiceId>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidIdentifier { kind: "invoice", .. }));
    }

    #[test]
    fn test_parse_empty_fails() {
        assert!("".parse::<AllocationId>().is_err());
    }
}

mod serialization {
    use super::*;

    #[test]
    fn test_serializes_as_bare_uuid() {
        let id = AllocationId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));
    }
}
