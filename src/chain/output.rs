use crate::reference::Reference;
use crate::value::{Param, ParamMap};

/// The terminal output mapping of a chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Mapping(ParamMap),
    Ref(Reference),
    Null,
}

impl Output {
    /// Builds a keyed output from `(key, value)` pairs, keeping their order.
    pub fn mapping<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Param>,
    {
        Output::Mapping(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

impl From<Reference> for Output {
    fn from(value: Reference) -> Self {
        Output::Ref(value)
    }
}

impl From<&Reference> for Output {
    fn from(value: &Reference) -> Self {
        Output::Ref(value.clone())
    }
}

impl From<ParamMap> for Output {
    fn from(value: ParamMap) -> Self {
        Output::Mapping(value)
    }
}

/// Values a chain setup closure may return as the chain's output.
///
/// Returning `()` or `None` leaves the output undefined, in which case the
/// compiled chain falls back to the last step's result.
pub trait IntoChainOutput {
    fn into_chain_output(self) -> Option<Output>;
}

impl IntoChainOutput for () {
    fn into_chain_output(self) -> Option<Output> {
        None
    }
}

impl IntoChainOutput for Output {
    fn into_chain_output(self) -> Option<Output> {
        Some(self)
    }
}

impl IntoChainOutput for Option<Output> {
    fn into_chain_output(self) -> Option<Output> {
        self
    }
}

impl IntoChainOutput for Reference {
    fn into_chain_output(self) -> Option<Output> {
        Some(Output::Ref(self))
    }
}

impl IntoChainOutput for ParamMap {
    fn into_chain_output(self) -> Option<Output> {
        Some(Output::Mapping(self))
    }
}
