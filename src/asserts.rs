//! Leveled contract checks.
//!
//! Violating one of these is a caller bug (merging in the wrong state, specifying a variable of a
//! merged token, terminating a token that is still externally constrained, ...), so every check
//! panics. The level decides how much checking happens: tests and the `debug-checks` feature run
//! everything, release builds only run the [`plandb_assert_simple`] checks.

#[cfg(all(not(test), not(feature = "debug-checks")))]
pub const PLANDB_ASSERT_LEVEL_DEFINITION: u8 = PLANDB_ASSERT_SIMPLE;

#[cfg(any(test, feature = "debug-checks"))]
pub const PLANDB_ASSERT_LEVEL_DEFINITION: u8 = PLANDB_ASSERT_EXTREME;

pub const PLANDB_ASSERT_SIMPLE: u8 = 1;
pub const PLANDB_ASSERT_MODERATE: u8 = 2;
pub const PLANDB_ASSERT_ADVANCED: u8 = 3;
pub const PLANDB_ASSERT_EXTREME: u8 = 4;

#[macro_export]
#[doc(hidden)]
macro_rules! plandb_assert_simple {
    ($($arg:tt)*) => {
        if $crate::asserts::PLANDB_ASSERT_LEVEL_DEFINITION >= $crate::asserts::PLANDB_ASSERT_SIMPLE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! plandb_assert_eq_simple {
    ($($arg:tt)*) => {
        if $crate::asserts::PLANDB_ASSERT_LEVEL_DEFINITION >= $crate::asserts::PLANDB_ASSERT_SIMPLE {
            assert_eq!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! plandb_assert_moderate {
    ($($arg:tt)*) => {
        if $crate::asserts::PLANDB_ASSERT_LEVEL_DEFINITION >= $crate::asserts::PLANDB_ASSERT_MODERATE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! plandb_assert_advanced {
    ($($arg:tt)*) => {
        if $crate::asserts::PLANDB_ASSERT_LEVEL_DEFINITION >= $crate::asserts::PLANDB_ASSERT_ADVANCED {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! plandb_assert_extreme {
    ($($arg:tt)*) => {
        if $crate::asserts::PLANDB_ASSERT_LEVEL_DEFINITION >= $crate::asserts::PLANDB_ASSERT_EXTREME {
            assert!($($arg)*);
        }
    };
}
