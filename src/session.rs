//! Profiling session: wraps one run of the host program.
//!
//! The session installs a [`CallTreeBuilder`] as the host's hook, lets the
//! host run to completion, then reduces, folds and writes the report. The
//! pipeline runs whether the host run succeeded or failed, and the host's
//! own result is handed back untouched.

use crate::aggregator::{build_folded_stacks, reduce, FlatStack};
use crate::output::write_folded;
use crate::profiler::{CallHook, CallTree, CallTreeBuilder, CycleClock, MonotonicClock, TscClock};
use crate::symbols::{ProcessSymbols, SymbolLookup, SymbolResolver};
use crate::utils::config::ProfilerConfig;
use log::{info, warn};
use std::time::Instant;

/// A host runtime that can execute a program while reporting calls
pub trait Runtime {
    /// Result of the run (exit code, error, ...)
    type Output;

    /// Run the program, delivering every call and return to `hook`
    fn execute(&mut self, hook: &mut dyn CallHook) -> Self::Output;
}

/// What a profiled run produced
#[derive(Debug)]
pub struct SessionOutcome<T> {
    /// The host's own result, unchanged by profiling
    pub result: T,

    /// Folded stacks, sorted by path
    pub stacks: Vec<FlatStack>,

    /// Whether the report reached its destination
    pub report_written: bool,
}

/// One profiling session; consumed by [`ProfileSession::run`]
#[derive(Debug)]
pub struct ProfileSession<C: CycleClock = TscClock, L: SymbolLookup = ProcessSymbols> {
    config: ProfilerConfig,
    clock: C,
    resolver: SymbolResolver<L>,
}

impl ProfileSession {
    /// Session timing with the CPU cycle counter and naming native frames
    /// from the process's own symbols
    pub fn new(config: ProfilerConfig) -> Self {
        Self::with_parts(config, TscClock::new(), ProcessSymbols::new())
    }

    /// Session timing in nanoseconds since it was created
    ///
    /// Use this where the cycle counter is not synchronised across cores.
    pub fn monotonic(config: ProfilerConfig) -> ProfileSession<MonotonicClock, ProcessSymbols> {
        ProfileSession::with_parts(config, MonotonicClock::new(), ProcessSymbols::new())
    }
}

impl<C: CycleClock, L: SymbolLookup> ProfileSession<C, L> {
    pub fn with_parts(config: ProfilerConfig, clock: C, lookup: L) -> Self {
        Self {
            config,
            clock,
            resolver: SymbolResolver::new(lookup),
        }
    }

    pub fn config(&self) -> &ProfilerConfig {
        &self.config
    }

    /// Profile one execution of `runtime`
    pub fn run<R: Runtime>(self, runtime: &mut R) -> SessionOutcome<R::Output> {
        self.run_with(|hook| runtime.execute(hook))
    }

    /// Profile one execution of an arbitrary closure driving the hook
    pub fn run_with<T, F>(self, execute: F) -> SessionOutcome<T>
    where
        F: FnOnce(&mut dyn CallHook) -> T,
    {
        let Self {
            config,
            clock,
            mut resolver,
        } = self;

        let started = Instant::now();
        let mut builder = CallTreeBuilder::new(clock);
        let result = execute(&mut builder);
        info!(
            "Host run finished in {:.2}s",
            started.elapsed().as_secs_f64()
        );

        let tree = builder.finish();
        let stacks = finalize(tree, &config, &mut resolver);

        let report_written = match write_folded(&stacks, &config.output_path) {
            Ok(()) => true,
            Err(e) => {
                warn!("Skipping folded report: {}", e);
                false
            }
        };

        SessionOutcome {
            result,
            stacks,
            report_written,
        }
    }
}

/// Reduce a finished tree and fold it into report records
///
/// **Public** - the post-run pipeline without the file output
pub fn finalize<L: SymbolLookup>(
    mut tree: CallTree,
    config: &ProfilerConfig,
    resolver: &mut SymbolResolver<L>,
) -> Vec<FlatStack> {
    reduce(&mut tree, config.compensate_overhead);
    let stacks = build_folded_stacks(&tree, resolver);
    info!(
        "Folded {} frames into {} stacks ({} native symbols resolved)",
        tree.len() - 1,
        stacks.len(),
        resolver.len()
    );
    stacks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::{CallSite, ManualClock, ReturnKind};
    use crate::symbols::SymbolTable;
    use tempfile::tempdir;

    /// Runtime calling one native function for a fixed number of cycles
    struct FixedRuntime {
        clock: ManualClock,
        exit_code: i32,
    }

    impl Runtime for FixedRuntime {
        type Output = Result<(), i32>;

        fn execute(&mut self, hook: &mut dyn CallHook) -> Self::Output {
            hook.on_call(&CallSite::entry());
            hook.on_call(&CallSite::native(0x40));
            self.clock.advance(70);
            hook.on_return(ReturnKind::Return);
            hook.on_return(ReturnKind::Return);
            if self.exit_code == 0 {
                Ok(())
            } else {
                Err(self.exit_code)
            }
        }
    }

    fn session(clock: &ManualClock, output: &std::path::Path) -> ProfileSession<ManualClock, SymbolTable> {
        let mut table = SymbolTable::new();
        table.insert(0x40, "os_execute");
        ProfileSession::with_parts(
            ProfilerConfig::new().with_output_path(output),
            clock.clone(),
            table,
        )
    }

    #[test]
    fn test_run_writes_report_and_keeps_result() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("stacks.fg");
        let clock = ManualClock::new();
        let mut runtime = FixedRuntime {
            clock: clock.clone(),
            exit_code: 0,
        };

        let outcome = session(&clock, &output).run(&mut runtime);

        assert_eq!(outcome.result, Ok(()));
        assert!(outcome.report_written);
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "root;LUA:main 0\nroot;LUA:main;C:os_execute 70\n"
        );
    }

    #[test]
    fn test_failed_run_still_reports() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("stacks.fg");
        let clock = ManualClock::new();
        let mut runtime = FixedRuntime {
            clock: clock.clone(),
            exit_code: 3,
        };

        let outcome = session(&clock, &output).run(&mut runtime);

        assert_eq!(outcome.result, Err(3));
        assert!(output.exists());
        assert_eq!(outcome.stacks.len(), 2);
    }

    #[test]
    fn test_monotonic_session_profiles_closure() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("stacks.fg");
        let session = ProfileSession::monotonic(ProfilerConfig::new().with_output_path(&output));

        let outcome = session.run_with(|hook| {
            hook.on_call(&CallSite::entry());
            hook.on_call(&CallSite::script(Some("configure"), None, None));
            std::hint::black_box((0..1_000u64).sum::<u64>());
            hook.on_return(ReturnKind::Return);
            hook.on_return(ReturnKind::Return);
            "done"
        });

        assert_eq!(outcome.result, "done");
        assert!(outcome.report_written);
        let paths: Vec<&str> = outcome.stacks.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["root;LUA:main", "root;LUA:main;LUA:configure"]);
    }

    #[test]
    fn test_unwritable_destination_is_skipped() {
        let dir = tempdir().unwrap();
        let clock = ManualClock::new();
        let mut runtime = FixedRuntime {
            clock: clock.clone(),
            exit_code: 0,
        };

        // the destination is a directory, so it cannot be opened for writing
        let outcome = session(&clock, dir.path()).run(&mut runtime);

        assert_eq!(outcome.result, Ok(()));
        assert!(!outcome.report_written);
        assert_eq!(outcome.stacks.len(), 2);
    }
}
