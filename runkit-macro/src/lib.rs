use proc_macro::TokenStream;

mod configurable;

/// Derive macro that emits the configuration descriptor table of a struct
///
/// Every named field becomes one flag, one environment variable and one key
/// of the application's section in the configuration file. Supported field
/// types are `bool`, `i64`, `String` and `Vec<String>`; anything else is
/// rejected at compile time, as is a field without a description.
///
/// # Example
/// ```ignore
/// use runkit::Configurable;
///
/// #[derive(Default, Configurable)]
/// pub struct Config {
///     #[config(description = "Address to listen on")]
///     listen_address: String,
///
///     #[config(description = "Upstream servers")]
///     upstreams: Vec<String>,
///
///     #[config(rename = "HTTPTimeout", description = "Timeout in seconds")]
///     timeout: i64,
///
///     #[config(skip)]
///     runtime_only: Option<std::path::PathBuf>,
/// }
/// ```
#[proc_macro_derive(Configurable, attributes(config))]
pub fn derive_configurable(input: TokenStream) -> TokenStream {
    configurable::derive_configurable(input)
}
