use fb_hash::{hash, hash_str, HashKey, HashVariant};
use pretty_assertions::assert_eq;

#[test]
fn published_fnv_vectors() {
    #[rustfmt::skip]
    let vectors: [(&str, HashVariant, u64); 8] = [
        ("",       HashVariant::Fnv1_32,  0x811C9DC5),
        ("foobar", HashVariant::Fnv1_32,  0x31F0B262),
        ("",       HashVariant::Fnv1a_32, 0x811C9DC5),
        ("foobar", HashVariant::Fnv1a_32, 0xBF9CF968),
        ("",       HashVariant::Fnv1_64,  0xCBF29CE484222325),
        ("foobar", HashVariant::Fnv1_64,  0x340D8765A4DDA9C2),
        ("",       HashVariant::Fnv1a_64, 0xCBF29CE484222325),
        ("foobar", HashVariant::Fnv1a_64, 0x85944171F73967E8),
    ];

    for (input, variant, expected) in vectors {
        assert_eq!(hash_str(input, variant), HashKey::from(expected), "{variant} {input:?}");
    }
}

#[test]
fn hashing_is_pure() {
    let identifier = "ID_W_M16A1_DESC";
    for variant in HashVariant::ALL {
        assert_eq!(variant.hash(identifier), variant.hash(identifier));
        assert_eq!(variant.hash(identifier), hash(identifier.as_bytes(), variant));
    }
}

#[test]
fn variants_disagree() {
    let keys = HashVariant::ALL.map(|variant| variant.hash("ID_M_SETTINGS"));
    for (i, a) in keys.iter().enumerate() {
        for b in &keys[i + 1..] {
            assert_ne!(a, b);
        }
    }
}
