/// Trait for loading service configuration from environment variables.
///
/// Implementors derive `serde::Deserialize`; each field maps to the
/// upper-cased env var of the same name (`mail_user` ← `MAIL_USER`).
/// Optional fields and `#[serde(default = "...")]` fields may be absent.
pub trait Config: Sized + serde::de::DeserializeOwned {
    fn from_env() -> Result<Self, envy::Error> {
        envy::from_env()
    }

    /// Load from an explicit list of `(key, value)` pairs instead of the process
    /// environment. Keys use the same upper-case convention as `from_env`.
    fn from_pairs<I, K, V>(pairs: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        envy::from_iter(pairs.into_iter().map(|(k, v)| (k.into(), v.into())))
    }
}
