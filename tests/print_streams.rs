mod common;
use common::*;
use sdpi::{io::ConfigurablePrintTarget, solver::*};

fn test_print_sdpi() -> Sdpi {
    let settings = SdpiSettingsBuilder::default().verbose(true).build().unwrap();
    let mut sdpi = Sdpi::new(NoSolver::new(), settings);
    sdpi.load_sdp(worked_example());
    sdpi
}

#[test]
fn test_print_to_stdout() {
    let mut sdpi = test_print_sdpi();
    sdpi.print_to_stdout();
    sdpi.solve(None, false, f64::INFINITY).unwrap();
}

#[test]
fn test_print_to_buffer() {
    let mut sdpi = test_print_sdpi();
    sdpi.print_to_buffer();
    sdpi.solve(None, false, f64::INFINITY).unwrap();
    let result = sdpi.get_print_buffer().unwrap();
    assert!(result.contains("sdpi v"));
    assert!(result.contains("variables     = 1"));
    assert!(result.contains("single variable Optimal"));
    assert!(result.contains("solve"));
}

#[test]
fn test_print_quiet() {
    let mut sdpi = test_print_sdpi();
    sdpi.set_param(SdpiParam::Epsilon, 1e-8).unwrap();
    let mut settings = sdpi.settings().clone();
    settings.verbose = false;

    let mut quiet = Sdpi::new(NoSolver::new(), settings);
    quiet.load_sdp(worked_example());
    quiet.print_to_buffer();
    quiet.solve(None, false, f64::INFINITY).unwrap();
    assert_eq!(quiet.get_print_buffer().unwrap(), "");
}

#[test]
fn test_print_to_file() {
    use std::io::{Read, Seek};

    let mut sdpi = test_print_sdpi();
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut file2 = file.reopen().unwrap();
    sdpi.print_to_file(file.into_file());
    sdpi.solve(None, false, f64::INFINITY).unwrap();

    file2.seek(std::io::SeekFrom::Start(0)).unwrap();
    let mut result = String::new();
    file2.read_to_string(&mut result).unwrap();
    assert!(result.contains("sdpi v"));
}

#[test]
fn test_print_to_stream() {
    use std::io::{Read, Seek};

    let mut sdpi = test_print_sdpi();
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut file2 = file.reopen().unwrap();
    let stream = Box::new(file.into_file());

    sdpi.print_to_stream(stream);
    sdpi.solve(None, false, f64::INFINITY).unwrap();

    file2.seek(std::io::SeekFrom::Start(0)).unwrap();
    let mut result = String::new();
    file2.read_to_string(&mut result).unwrap();
    assert!(result.contains("Terminated with status"));
}

// a stream that refuses every write
struct BrokenStream;

impl std::io::Write for BrokenStream {
    fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
        Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
    }
}

#[test]
fn test_print_failure_keeps_result() {
    let mut sdpi = test_print_sdpi();
    sdpi.print_to_stream(Box::new(BrokenStream));

    assert!(sdpi.solve(None, false, f64::INFINITY).is_ok());
    assert!(sdpi.was_solved());
    assert!(sdpi.is_optimal());
    assert!(f64::abs(sdpi.objval().unwrap()) <= 1e-6);
}
