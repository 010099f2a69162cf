use std::collections::HashMap;
use std::io::Write;
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

#[derive(Debug, Default, Clone)]
struct InnerTimer {
    start: Option<Instant>,
    elapsed: Duration,
    subtimers: SubTimersMap,
}

impl InnerTimer {
    fn reset(&mut self) {
        self.start = None;
        self.elapsed = Duration::ZERO;
        self.subtimers.clear();
    }

    fn start(&mut self) {
        self.start = Some(Instant::now());
    }

    fn stop(&mut self) {
        if let Some(instant) = self.start.take() {
            self.elapsed += instant.elapsed();
        }
    }

    // includes the running interval of an active timer
    fn elapsed(&self) -> Duration {
        self.elapsed + self.start.map_or(Duration::ZERO, |s| s.elapsed())
    }
}

#[derive(Debug, Default, Clone)]
struct SubTimersMap(HashMap<&'static str, InnerTimer>);

impl Deref for SubTimersMap {
    type Target = HashMap<&'static str, InnerTimer>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl DerefMut for SubTimersMap {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl SubTimersMap {
    fn start_subtimer(&mut self, key: &'static str) {
        let t = self.0.entry(key).or_default();
        t.start();
    }

    fn total_time(&self) -> Duration {
        self.values()
            .fold(Duration::ZERO, |acc, t| acc + t.elapsed())
    }

    fn find(&self, key: &'static str) -> Option<&InnerTimer> {
        self.get(key)
            .or_else(|| self.values().find_map(|t| t.subtimers.find(key)))
    }

    fn print(&self, out: &mut dyn Write, depth: u8) -> std::io::Result<()> {
        let mut keys: Vec<_> = self.keys().collect();
        keys.sort();
        for key in keys {
            let val = &self[key];
            let tabs = format!("{: <1$}", "", 4 * depth as usize);
            writeln!(out, "{}{:} : {:?}", tabs, *key, val.elapsed())?;
            val.subtimers.print(out, depth + 1)?;
        }
        Ok(())
    }
}

/// Nested phase timers.  Each solve runs inside a top level "solve"
/// timer with one child per phase.
#[derive(Default, Debug, Clone)]
pub(crate) struct Timers {
    stack: Vec<&'static str>,
    subtimers: SubTimersMap,
}

impl Timers {
    fn mut_active_timer(&mut self) -> Option<&mut InnerTimer> {
        let (first, rest) = self.stack.split_first()?;
        let mut active_timer = self.subtimers.get_mut(first)?;
        for key in rest {
            active_timer = active_timer.subtimers.get_mut(key)?;
        }
        Some(active_timer)
    }

    pub fn reset(&mut self) {
        self.stack.clear();
        self.subtimers.values_mut().for_each(|t| t.reset());
        self.subtimers.clear();
    }

    pub fn start_as_current(&mut self, key: &'static str) {
        //starts a timer with name "key" as the current timer
        if let Some(active) = self.mut_active_timer() {
            active.subtimers.start_subtimer(key);
        } else {
            self.subtimers.start_subtimer(key);
        }
        self.stack.push(key);
    }

    pub fn stop_current(&mut self) {
        if let Some(active) = self.mut_active_timer() {
            active.stop();
        }
        self.stack.pop();
    }

    /// Total time recorded, including currently running timers
    pub fn total_time(&self) -> Duration {
        self.subtimers.total_time()
    }

    /// Time recorded under `key` at any depth
    pub fn get_time(&self, key: &'static str) -> Duration {
        self.subtimers
            .find(key)
            .map_or(Duration::ZERO, |t| t.elapsed())
    }

    pub fn print(&self, out: &mut dyn Write) -> std::io::Result<()> {
        self.subtimers.print(out, 0)
    }
}

macro_rules! timeit {
    ($timer:expr => $key:literal; $($tt:tt)+) => {

        $timer.start_as_current($key);
        $(
            $tt
        )+
        $timer.stop_current();
    }
}
pub(crate) use timeit;

#[test]
fn test_nested_timers() {
    let mut timers = Timers::default();

    timeit! {timers => "solve";
        timeit! {timers => "presolve";
            std::thread::sleep(Duration::from_millis(2));
        }
        // running time is visible before the outer timer stops
        assert!(timers.total_time() >= Duration::from_millis(2));
    }

    assert!(timers.get_time("presolve") >= Duration::from_millis(2));
    assert!(timers.get_time("solve") >= timers.get_time("presolve"));
    assert_eq!(timers.get_time("backend"), Duration::ZERO);

    let mut buf = Vec::<u8>::new();
    timers.print(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.starts_with("solve"));
    assert!(text.contains("    presolve"));

    timers.reset();
    assert_eq!(timers.total_time(), Duration::ZERO);
}
