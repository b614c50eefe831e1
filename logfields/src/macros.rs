//! Macros for building log-call arguments.
//!
//! - `arguments!`: Creates the positional argument list of a log call
//! - `map!`: Creates a [`Map`](crate::value::Map) with flexible key syntax

/// Creates a `Vec<Argument>` from markers and plain values.
///
/// Every element goes through [`IntoArgument`](crate::argument::IntoArgument), so markers,
/// shared markers and anything convertible into a [`Value`](crate::value::Value) can be
/// mixed.
///
/// # Examples
///
/// ```rust
/// use logfields::argument::Argument;
/// use logfields::arguments;
/// use logfields::structured::key_value;
///
/// let args = arguments![key_value("x", 1), "plainArg", vec![1, 2, 3]];
/// assert_eq!(args.len(), 3);
/// assert!(args[0].field_emitter().is_some());
/// assert!(matches!(args[1], Argument::Value(_)));
/// ```
///
/// Empty argument list:
/// ```rust
/// use logfields::argument::Argument;
/// use logfields::arguments;
///
/// let args: Vec<Argument> = arguments![];
/// assert!(args.is_empty());
/// ```
#[macro_export]
macro_rules! arguments {
    ($($argument:expr),* $(,)?) => {
        ::std::vec![$($crate::argument::IntoArgument::into_argument($argument)),*]
    };
}

/// Creates a [`Map`](crate::value::Map) from key-value pairs.
///
/// # Examples
///
/// ```rust
/// use logfields::map;
///
/// let team = "core";
/// let retries = 3;
/// let labels = map!(team, "zone" = "eu", retry_count = retries);
///
/// assert_eq!(labels.len(), 3);
/// assert_eq!(labels.iter().map(|(key, _)| key).collect::<Vec<_>>(), ["team", "zone", "retry_count"]);
/// ```
#[macro_export]
macro_rules! map {
    ({ $($kvs:tt)* }) => {
        $crate::map_inner!(@ { }, { $($kvs)* })
    };
    ($($kvs:tt)*) => {
        $crate::map_inner!(@ { }, { $($kvs)* })
    };
}

/// The actual implementation of `map!`, separated out to avoid accidentally recursing into
/// the `$($tt)*` case from the inner cases.
#[doc(hidden)]
#[macro_export]
macro_rules! map_inner {
    // Base case, remaining tokens is empty.
    (@ { $(($key:expr, $value:expr),)* }, { } ) => {{
        #[allow(unused_mut)]
        let mut map = $crate::value::Map::new();
        $(map.insert($key, $value);)*
        map
    }};

    // Recursive cases, take one key-value pair, add it to the output, and recurse on the remaining
    // tokens.
    (@ { $($out:tt)* }, { $key:ident $(, $($rest:tt)*)? }) => {
        $crate::map_inner!(
            @ { $($out)* (::core::stringify!($key), $key), },
            { $($($rest)*)? }
        )
    };
    (@ { $($out:tt)* }, { $key:ident = $value:expr $(, $($rest:tt)*)? }) => {
        $crate::map_inner!(
            @ { $($out)* (::core::stringify!($key), $value), },
            { $($($rest)*)? }
        )
    };
    (@ { $($out:tt)* }, { $key:literal = $value:expr $(, $($rest:tt)*)? }) => {
        $crate::map_inner!(
            @ { $($out)* ($key, $value), },
            { $($($rest)*)? }
        )
    };
}
