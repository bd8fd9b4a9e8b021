//! Logging macros taking a `Code` and optional `"key" => value` context
//! pairs. Every macro is a no-op until a global logger is installed; context
//! values only need `Display`.

#[doc(hidden)]
#[macro_export]
macro_rules! __formula_log_event {
    ($event:expr $(, $key:expr => $value:expr)*) => {
        $crate::logging::emit(|| {
            #[allow(unused_mut)]
            let mut event = $event;
            $(
                event = event.with_context($key, &format!("{}", $value));
            )*
            event
        })
    };
}

/// Log an error event; `span = ...` attaches a source location
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr, span = $span:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__formula_log_event!(
            $crate::logging::LogEvent::error($code, $message).with_span($span)
            $(, $key => $value)*
        )
    };

    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__formula_log_event!(
            $crate::logging::LogEvent::error($code, $message)
            $(, $key => $value)*
        )
    };
}

/// Log a stage completion under a success code
#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__formula_log_event!(
            $crate::logging::LogEvent::success($code, $message)
            $(, $key => $value)*
        )
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__formula_log_event!(
            $crate::logging::LogEvent::info($message)
            $(, $key => $value)*
        )
    };
}

#[macro_export]
macro_rules! log_warning {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__formula_log_event!(
            $crate::logging::LogEvent::warning($message)
            $(, $key => $value)*
        )
    };
}

#[macro_export]
macro_rules! log_debug {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::__formula_log_event!(
            $crate::logging::LogEvent::debug($message)
            $(, $key => $value)*
        )
    };
}
