//! Unit tests for the identifier newtypes

use core_kernel::{
    OwnerId, PropertyId, PropertyImageId, PropertyTraceId, UserId, RoleId, RefreshTokenId,
};

mod owner_id_tests {
    use super::*;

    #[test]
    fn test_roundtrips_through_i64() {
        let id = OwnerId::new(42);
        let raw: i64 = id.into();
        assert_eq!(raw, 42);
        assert_eq!(OwnerId::from(raw), id);
    }

    #[test]
    fn test_is_valid_only_for_positive_keys() {
        assert!(OwnerId::new(1).is_valid());
        assert!(!OwnerId::new(0).is_valid());
        assert!(!OwnerId::new(-3).is_valid());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("abc".parse::<OwnerId>().is_err());
        assert_eq!("9".parse::<OwnerId>().unwrap(), OwnerId::new(9));
    }
}

mod entity_names {
    use super::*;

    #[test]
    fn test_entity_names_used_in_messages() {
        assert_eq!(OwnerId::entity(), "Owner");
        assert_eq!(PropertyId::entity(), "Property");
        assert_eq!(PropertyImageId::entity(), "PropertyImage");
        assert_eq!(PropertyTraceId::entity(), "PropertyTrace");
        assert_eq!(UserId::entity(), "User");
        assert_eq!(RoleId::entity(), "Role");
        assert_eq!(RefreshTokenId::entity(), "RefreshToken");
    }
}

mod serde_tests {
    use super::*;

    #[test]
    fn test_deserialize_from_number() {
        let id: PropertyId = serde_json::from_str("15").unwrap();
        assert_eq!(id.value(), 15);
    }

    #[test]
    fn test_ordering_follows_key() {
        let mut ids = vec![PropertyId::new(3), PropertyId::new(1), PropertyId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![PropertyId::new(1), PropertyId::new(2), PropertyId::new(3)]);
    }
}
