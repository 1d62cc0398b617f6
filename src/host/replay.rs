//! Replay of a recorded event trace as a host runtime.
//!
//! The replayer plays the part of the scripting runtime: it walks the
//! recorded events in order and delivers each one to the hook, after moving
//! the shared [`ManualClock`] to the event's recorded timestamp. Reported
//! cycles are therefore exactly the recorded deltas.

use crate::parser::TraceEvent;
use crate::profiler::{CallHook, ManualClock, ReturnKind};
use crate::session::Runtime;
use log::debug;

/// Result of replaying a trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayOutcome {
    /// Events delivered to the hook
    pub events: usize,

    /// Exit code of the recorded run
    pub exit_code: i32,
}

/// Runtime that replays recorded hook events
#[derive(Debug)]
pub struct TraceReplay {
    events: Vec<TraceEvent>,
    exit_code: i32,
    clock: ManualClock,
}

impl TraceReplay {
    /// `clock` must be shared with the profiling session
    pub fn new(events: Vec<TraceEvent>, exit_code: i32, clock: ManualClock) -> Self {
        Self {
            events,
            exit_code,
            clock,
        }
    }
}

impl Runtime for TraceReplay {
    type Output = ReplayOutcome;

    fn execute(&mut self, hook: &mut dyn CallHook) -> ReplayOutcome {
        debug!("Replaying {} events", self.events.len());

        for event in &self.events {
            self.clock.set(event.at());
            match event {
                TraceEvent::Call { site, .. } => hook.on_call(&site.call_site()),
                TraceEvent::Return { .. } => hook.on_return(ReturnKind::Return),
                TraceEvent::TailReturn { .. } => hook.on_return(ReturnKind::TailReturn),
            }
        }

        ReplayOutcome {
            events: self.events.len(),
            exit_code: self.exit_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_trace;
    use crate::profiler::{CallSite, CycleClock};

    /// Hook recording what it saw and when
    struct Recorder {
        clock: ManualClock,
        seen: Vec<String>,
    }

    impl CallHook for Recorder {
        fn on_call(&mut self, site: &CallSite<'_>) {
            self.seen
                .push(format!("call {:?} @{}", site.kind(), self.clock.now()));
        }

        fn on_return(&mut self, kind: ReturnKind) {
            self.seen.push(format!("{:?} @{}", kind, self.clock.now()));
        }
    }

    #[test]
    fn test_replay_delivers_events_at_recorded_times() {
        let trace = parse_trace(
            r#"{ "exit_code": 1, "events": [
                { "event": "call", "at": 3, "what": "main" },
                { "event": "call", "at": 5, "what": "Lua", "name": "f" },
                { "event": "tail_return", "at": 8 },
                { "event": "return", "at": 13 }
            ] }"#,
        )
        .unwrap();

        let clock = ManualClock::new();
        let mut replay = TraceReplay::new(trace.events, trace.exit_code, clock.clone());
        let mut recorder = Recorder {
            clock,
            seen: Vec::new(),
        };

        let outcome = replay.execute(&mut recorder);

        assert_eq!(
            outcome,
            ReplayOutcome {
                events: 4,
                exit_code: 1
            }
        );
        assert_eq!(
            recorder.seen,
            vec![
                "call ProgramEntry @3",
                "call Interpreted @5",
                "TailReturn @8",
                "Return @13",
            ]
        );
    }
}
