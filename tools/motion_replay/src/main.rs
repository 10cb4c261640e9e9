use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
};

// Host implementation of the critical section used by the engine's shared wrapper.
use critical_section as _;
use stridewatch::motion_engine::{
    ActivityMode, ClassifierContext, EngineOutput, ModeResult, Status,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ReplaySample {
    seq: u16,
    x: i16,
    z: i16,
}

#[derive(Debug, PartialEq, Eq)]
struct ReplayArgs {
    trace_path: PathBuf,
    mode: ActivityMode,
    age: Option<u16>,
    expect_path: Option<PathBuf>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    let Some(args) = parse_args(&args[1..])? else {
        println!("{}", usage());
        return Ok(());
    };

    let samples = parse_trace(&args.trace_path)?;
    let mut ctx = ClassifierContext::default();
    if let Some(age) = args.age {
        ctx.select_age_profile(age);
    }

    let mut lines: Vec<String> = Vec::new();
    for sample in &samples {
        let output = ctx.classify(sample.x, sample.z, sample.seq, args.mode);
        if let Some(line) = format_output(args.mode, &output) {
            println!("result,{},{}", sample.seq, line);
            lines.push(line);
        }
    }

    if let Some(expect_path) = args.expect_path {
        let expected = parse_expected(&expect_path)?;
        if lines != expected {
            eprintln!("expected: {}", expected.join(" | "));
            eprintln!("actual:   {}", lines.join(" | "));
            return Err("result sequence mismatch".into());
        }
    }

    Ok(())
}

fn usage() -> String {
    "usage: motion_replay <trace.csv> --mode <name> [--age N] [--expect expected.txt]".to_string()
}

fn parse_args(args: &[String]) -> Result<Option<ReplayArgs>, String> {
    if args.is_empty() {
        return Err(usage());
    }

    let mut trace_path: Option<PathBuf> = None;
    let mut mode: Option<ActivityMode> = None;
    let mut age: Option<u16> = None;
    let mut expect_path: Option<PathBuf> = None;

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--mode" => {
                idx += 1;
                let Some(name) = args.get(idx) else {
                    return Err("missing name after --mode".into());
                };
                mode = Some(parse_mode(name)?);
            }
            "--age" => {
                idx += 1;
                let Some(raw) = args.get(idx) else {
                    return Err("missing value after --age".into());
                };
                age = Some(
                    raw.parse::<u16>()
                        .map_err(|e| format!("invalid age '{raw}': {e}"))?,
                );
            }
            "--expect" => {
                idx += 1;
                let Some(path) = args.get(idx) else {
                    return Err("missing path after --expect".into());
                };
                expect_path = Some(PathBuf::from(path));
            }
            "-h" | "--help" => return Ok(None),
            value if value.starts_with('-') => {
                return Err(format!("unknown argument: {value}"));
            }
            value => {
                if trace_path.is_some() {
                    return Err("multiple trace paths provided".into());
                }
                trace_path = Some(PathBuf::from(value));
            }
        }
        idx += 1;
    }

    Ok(Some(ReplayArgs {
        trace_path: trace_path.ok_or_else(usage)?,
        mode: mode.ok_or("missing --mode")?,
        age,
        expect_path,
    }))
}

fn parse_mode(name: &str) -> Result<ActivityMode, String> {
    if let Ok(id) = name.parse::<u8>() {
        return ActivityMode::try_from(id).map_err(|e| e.to_string());
    }
    name.parse::<ActivityMode>()
        .map_err(|_| format!("unknown mode '{name}'"))
}

fn parse_trace(path: &Path) -> Result<Vec<ReplaySample>, String> {
    let text =
        fs::read_to_string(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    parse_trace_str(&text).map_err(|e| format!("{}:{e}", path.display()))
}

/// Parses `seq,x,z` rows. Blank lines, `#` comments and the header row are skipped.
fn parse_trace_str(text: &str) -> Result<Vec<ReplaySample>, String> {
    let mut out = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line_no = line_no + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed == "seq,x,z" {
            continue;
        }

        let parts: Vec<&str> = trimmed.split(',').collect();
        if parts.len() != 3 {
            return Err(format!("{line_no} invalid trace line, expected seq,x,z"));
        }
        out.push(ReplaySample {
            seq: parse_field(parts[0], line_no, "seq")?,
            x: parse_field(parts[1], line_no, "x")?,
            z: parse_field(parts[2], line_no, "z")?,
        });
    }
    Ok(out)
}

fn parse_field<T>(raw: &str, line_no: usize, field: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| format!("{line_no} invalid {field} '{}': {e}", raw.trim()))
}

fn parse_expected(path: &Path) -> Result<Vec<String>, String> {
    let text =
        fs::read_to_string(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// One line per finished cycle; charging outputs produce nothing.
fn format_output(mode: ActivityMode, output: &EngineOutput) -> Option<String> {
    match output.status {
        Status::DataCharging => None,
        Status::Error => Some(format!(
            "{},error,{}",
            mode.label(),
            output
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".into())
        )),
        Status::Success => Some(format!(
            "{},{}",
            mode.label(),
            output.result.map(format_result).unwrap_or_default()
        )),
    }
}

fn format_result(result: ModeResult) -> String {
    match result {
        ModeResult::Daily(count) => {
            format!("walk={},run={},dash={}", count.walk, count.run, count.dash)
        }
        ModeResult::Flight(record) => format!(
            "samples={},ms={},start={}",
            record.samples,
            record.duration_ms,
            record.start.get()
        ),
        ModeResult::Count(count) => format!("count={count}"),
        ModeResult::Onset(record) => match record.onset {
            Some(seq) => format!("onset={}", seq.get()),
            None => "onset=none".to_string(),
        },
    }
}
