use serde::{Deserialize, Serialize};

/// A value as the preference store holds it.
///
/// Stores only know three kinds, mirroring the int/float/string triple of
/// `PlayerPrefs`. Richer Rust types are mapped onto these by [`PrefValue`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    Int(i32),
    Float(f32),
    Str(String),
}

impl Scalar {
    /// Name of the scalar kind, used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            Scalar::Int(_) => "int",
            Scalar::Float(_) => "float",
            Scalar::Str(_) => "string",
        }
    }
}

/// A Rust type that can be stored under a single preference key.
///
/// `from_scalar` must never fail: an absent key, or a key holding a different
/// kind of scalar, reads as the type's zero value.
pub trait PrefValue: Sized {
    /// The value read back for a key that was never set.
    fn zero() -> Self;

    fn into_scalar(self) -> Scalar;

    /// Converts a stored scalar, `None` if the kind doesn't match.
    fn try_from_scalar(scalar: Scalar) -> Option<Self>;

    fn from_scalar(scalar: Option<Scalar>) -> Self {
        scalar.and_then(Self::try_from_scalar).unwrap_or_else(Self::zero)
    }
}

macro_rules! impl_pref_value {
    ($($type:ty => $variant:ident, $zero:expr;)*) => {
        $(
            impl PrefValue for $type {
                fn zero() -> Self {
                    $zero
                }

                fn into_scalar(self) -> Scalar {
                    Scalar::$variant(self)
                }

                fn try_from_scalar(scalar: Scalar) -> Option<Self> {
                    match scalar {
                        Scalar::$variant(value) => Some(value),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_pref_value! {
    i32 => Int, 0;
    f32 => Float, 0.0;
    String => Str, String::new();
}

// Booleans are stored as ints, 0 or 1, like PlayerPrefs users do by hand.
impl PrefValue for bool {
    fn zero() -> Self {
        false
    }

    fn into_scalar(self) -> Scalar {
        Scalar::Int(self as i32)
    }

    fn try_from_scalar(scalar: Scalar) -> Option<Self> {
        match scalar {
            Scalar::Int(value) => Some(value != 0),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_value_reads_as_zero() {
        assert_eq!(i32::from_scalar(None), 0);
        assert_eq!(f32::from_scalar(None), 0.0);
        assert_eq!(String::from_scalar(None), "");
        assert!(!bool::from_scalar(None));
    }

    #[test]
    fn test_mismatched_kind_reads_as_zero() {
        assert_eq!(i32::from_scalar(Some(Scalar::Str("7".to_string()))), 0);
        assert_eq!(String::from_scalar(Some(Scalar::Int(7))), "");
        assert!(!bool::from_scalar(Some(Scalar::Float(1.0))));
    }

    #[test]
    fn test_bool_is_encoded_as_int() {
        assert_eq!(true.into_scalar(), Scalar::Int(1));
        assert_eq!(false.into_scalar(), Scalar::Int(0));
        assert!(bool::from_scalar(Some(Scalar::Int(5))));
        assert_eq!(true.into_scalar().kind(), "int");
        assert_eq!(Scalar::Str(String::new()).kind(), "string");
    }

    #[test]
    fn test_scalar_toml_is_untagged() {
        #[derive(Serialize, Deserialize)]
        struct Doc {
            value: Scalar,
        }
        let text = toml::to_string(&Doc { value: Scalar::Int(3) }).unwrap();
        assert_eq!(text.trim(), "value = 3");
        let doc: Doc = toml::from_str("value = \"hi\"").unwrap();
        assert_eq!(doc.value, Scalar::Str("hi".to_string()));
    }
}
