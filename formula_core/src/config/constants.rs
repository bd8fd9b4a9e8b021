pub mod compile_time {
    pub mod lexical {
        /// Maximum formula length in characters accepted by the lexer
        /// SECURITY: Bounds token buffering for a single formula
        pub const MAX_FORMULA_LENGTH: usize = 65_536;
    }

    pub mod syntax {
        /// Hard ceiling on parser recursion depth to prevent stack overflow
        /// SECURITY: Runtime preferences can lower but never raise it
        pub const MAX_PARSE_DEPTH: usize = 256;

        /// Depth used when no preference is configured
        pub const DEFAULT_PARSE_DEPTH: usize = 128;
    }

    pub mod functions {
        /// Largest digit count accepted by Round(value, digits)
        pub const MAX_ROUND_DIGITS: i32 = 15;

        /// Two-digit years below this pivot map to 20xx in DateSerial
        pub const TWO_DIGIT_YEAR_PIVOT: i32 = 30;
    }

    pub mod logging {
        /// In-memory event buffer size for `MemoryLogger`
        /// RESOURCE: Controls memory usage of captured events
        pub const LOG_BUFFER_SIZE: usize = 10_000;

        /// Log messages longer than this are truncated
        pub const MAX_LOG_MESSAGE_LENGTH: usize = 2_048;
    }
}
