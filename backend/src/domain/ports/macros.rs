//! `define_port_error!`: error enums for driven ports.
//!
//! Each variant gets a `#[error]` message and a snake_case constructor whose
//! fields take `impl Into<T>`, so adapters write
//! `InvoiceRepositoryError::query(format!(..))` instead of struct literals.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@fields $variant [] [] $( $field : $ty, )*);
    };

    // Fields are consumed one at a time into parameter and initialiser lists.
    (@fields $variant:ident [$($params:tt)*] [$($inits:tt)*]) => {
        ::paste::paste! {
            #[doc = concat!("Build [`Self::", stringify!($variant), "`].")]
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@fields $variant:ident [$($params:tt)*] [$($inits:tt)*] $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @fields
            $variant
            [$($params)* $field: impl Into<$ty>,]
            [$($inits)* $field: $field.into(),]
            $($rest)*
        );
    };

    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    define_port_error! {
        /// Shape of a typical repository error.
        pub enum LedgerError {
            Offline => "ledger offline",
            Query { message: String } => "ledger query failed: {message}",
            Stale { invoice: String, attempts: u32 } => "invoice {invoice} stale after {attempts} attempts",
        }
    }

    #[rstest]
    #[case(LedgerError::offline(), LedgerError::Offline, "ledger offline")]
    #[case(
        LedgerError::query("timeout"),
        LedgerError::Query { message: "timeout".to_owned() },
        "ledger query failed: timeout"
    )]
    #[case(
        LedgerError::stale("TPC-20260301-7K2M9Q", 3_u32),
        LedgerError::Stale { invoice: "TPC-20260301-7K2M9Q".to_owned(), attempts: 3 },
        "invoice TPC-20260301-7K2M9Q stale after 3 attempts"
    )]
    fn constructors_build_the_named_variant(
        #[case] built: LedgerError,
        #[case] expected: LedgerError,
        #[case] message: &str,
    ) {
        assert_eq!(built, expected);
        assert_eq!(built.to_string(), message);
    }
}
