//! Declarative config schemas

/// Declare a configuration struct together with its defaults
///
/// One block produces the struct (public fields), its `Default` impl and the
/// serde derives with `#[serde(default)]`, so a field's name, type and
/// default value can never drift apart across three definitions. Partial
/// TOML files parse cleanly: any missing field takes its declared default.
///
/// ```rust,ignore
/// config_struct! {
///     pub struct ScraperConfig {
///         batch_size: usize = 100,
///     }
/// }
/// ```
#[macro_export]
macro_rules! config_struct {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident: $ty:ty = $default:expr
            ),*
            $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
        #[serde(default)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field: $ty,
            )*
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    $(
                        $field: $default,
                    )*
                }
            }
        }
    };
}
