//! Exercises wrappers generated by `handlegen-codegen` against a
//! scripted mock runtime.
//!
//! The build script renders `descriptors.json` once per error
//! policy. Each rendering lives in its own module.

pub mod defs;

macro_rules! generated {
    ($($module:ident => $file:literal),+ $(,)?) => {
        $(
            #[allow(
                clippy::arithmetic_side_effects,
                clippy::needless_return,
                clippy::unnecessary_lazy_evaluations,
                unused_qualifications,
            )]
            pub mod $module {
                #[allow(unused_imports)]
                use crate::defs::{DEFAULT_TIMEOUT, MockRuntime, SessionRaw, XrResult};

                /// A native instance.
                #[derive(Copy, Clone, Debug, Eq, PartialEq)]
                pub struct Instance {
                    pub raw: u64,
                }

                include!(concat!(env!("OUT_DIR"), "/", $file));
            }
        )+
    };
}

generated! {
    assert_only => "assert_only.rs",
    always_fail => "always_fail.rs",
    conditional => "conditional.rs",
}

#[cfg(test)]
mod tests;
