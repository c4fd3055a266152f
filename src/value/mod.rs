//! Parameter values for step definitions.

pub mod param;

pub use param::*;

/// Builds an ordered [`ParamMap`] from `key => value` pairs.
///
/// Values go through `Into<Param>`, so literals and references mix freely and
/// the key order is exactly the order written.
///
/// ```
/// use stepchain::params;
/// use stepchain::reference::Reference;
///
/// let text = Reference::step_output("pdf_to_text").field("text");
/// let map = params! {
///     "method" => "tokens",
///     "num_tokens" => 500,
///     "text" => &text,
/// };
/// assert_eq!(map.keys().collect::<Vec<_>>(), ["method", "num_tokens", "text"]);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::value::ParamMap::new()
    };
    ( $( $key:expr => $value:expr ),+ $(,)? ) => {{
        let mut map = $crate::value::ParamMap::new();
        $( map.insert(::std::string::String::from($key), $crate::value::Param::from($value)); )+
        map
    }};
}
