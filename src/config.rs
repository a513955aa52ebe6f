//! Runtime limits for the virtual machine.

pub const DEFAULT_STACK_MAX: usize = 256;

#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of values on the stack before a push fails.
    pub stack_max: usize,

    /// Log every instruction and the stack contents at `trace` level.
    pub trace_execution: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            stack_max: DEFAULT_STACK_MAX,
            trace_execution: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stack_max(mut self, stack_max: usize) -> Self {
        self.stack_max = stack_max;
        self
    }

    pub fn with_trace_execution(mut self, trace_execution: bool) -> Self {
        self.trace_execution = trace_execution;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_is_opt_in() {
        let config = Config::default();
        assert_eq!(config.stack_max, DEFAULT_STACK_MAX);
        assert!(!config.trace_execution);

        let config = Config::new().with_trace_execution(true).with_stack_max(8);
        assert!(config.trace_execution);
        assert_eq!(config.stack_max, 8);
    }
}
