//! Macros for error creation and handling

/// Create an error of the given kind with a formatted message
#[macro_export]
macro_rules! err {
    ($kind:ident) => {
        $crate::error::Error::new($crate::error::ErrorKind::$kind)
    };
    ($kind:ident, $($arg:tt)+) => {
        $crate::error::Error::msg($crate::error::ErrorKind::$kind, format!($($arg)+))
    };
}

/// Return early with an error
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::err!($($arg)*))
    };
}

/// Return early with an error unless a condition holds
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            $crate::bail!($($arg)*);
        }
    };
}
