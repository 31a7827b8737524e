//! Registration macro for step tables.

/// Build a provider's step table from its step method names.
///
/// Each method identifier becomes the descriptor's name, so the numbering a
/// reader sees in the source is the numbering the registry validates.
///
/// ```ignore
/// fn steps() -> Vec<StepDescriptor<Self>> {
///     step_table![Self; step_1, step_2, step_4]
/// }
/// ```
#[macro_export]
macro_rules! step_table {
    ($provider:ty; $($step:ident),* $(,)?) => {
        vec![
            $($crate::StepDescriptor::<$provider>::new(stringify!($step), <$provider>::$step)),*
        ]
    };
}
