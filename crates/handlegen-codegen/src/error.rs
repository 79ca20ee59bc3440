//! Error reporting.

use std::{
    error::Error,
    fmt,
    io::{self, Write},
};

/// An error returned when generating wrappers.
pub enum BuildError {
    /// A bad descriptor or configuration, reported by `syn`.
    ///
    /// May contain more than one error; see
    /// [`syn::Error::into_iter`].
    Syn(syn::Error),
    /// Some other error.
    Other(anyhow::Error),
}

impl Error for BuildError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Syn(err) => Some(err),
            Self::Other(err) => Some(err.as_ref()),
        }
    }
}

impl From<syn::Error> for BuildError {
    fn from(err: syn::Error) -> Self {
        Self::Syn(err)
    }
}

impl From<anyhow::Error> for BuildError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err)
    }
}

impl fmt::Debug for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unable to generate wrappers: {self}")
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syn(err) => {
                let mut first = true;
                for err in err.clone() {
                    if !first {
                        writeln!(f)?;
                    }
                    first = false;
                    write!(f, "error: {err}")?;
                }
                Ok(())
            }
            Self::Other(err) => write!(f, "error: {err:#}"),
        }
    }
}

impl BuildError {
    /// Writes the error to stderr, one line per diagnostic.
    pub fn display(&self) {
        let _ = writeln!(io::stderr(), "{self}");
    }

    /// Returns each diagnostic message.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Syn(err) => err.clone().into_iter().map(|e| e.to_string()).collect(),
            Self::Other(err) => vec![format!("{err:#}")],
        }
    }
}
