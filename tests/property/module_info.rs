use crate::utils::module_info;
use code_insight::recording::ModuleInfo;
use proptest::prelude::*;

proptest! {
    #[test]
    fn test_serialize_deserialize_round_trip(info in module_info()) {
        let serialized = info.serialize();
        prop_assert_eq!(ModuleInfo::deserialize(&serialized).unwrap(), info.clone());

        let bytes = info.to_bytes().unwrap();
        prop_assert_eq!(ModuleInfo::from_bytes(&bytes).unwrap(), info);
    }
}
