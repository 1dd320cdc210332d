/// Builds a [`RawTransaction`](crate::RawTransaction) from `item => utility` pairs.
#[macro_export(local_inner_macros)]
macro_rules! transaction {
    (@single $($x:tt)*) => (());
    (@count $($rest:expr),*) => (<[()]>::len(&[$(transaction!(@single $rest)),*]));

    ($($item:expr => $utility:expr,)+) => { transaction!($($item => $utility),+) };
    ($($item:expr => $utility:expr),*) => {
        {
            let _cap = transaction!(@count $($item),*);
            let mut _pairs = ::std::vec::Vec::with_capacity(_cap);
            $(
                _pairs.push(($item, $utility));
            )*
            $crate::RawTransaction::from_pairs(_pairs)
        }
    };
}

/// Builds a [`Dataset`](crate::Dataset), one `{item => utility, ...}` group per transaction.
#[macro_export]
macro_rules! dataset {
    ($($tx:tt,)+) => { $crate::dataset!($($tx),+) };
    ($($tx:tt),*) => {
        $crate::Dataset::from_transactions(::std::vec![$(
            $crate::transaction! $tx
        ),*])
    };
}
