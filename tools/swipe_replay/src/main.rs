use std::{
    env,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    process,
    rc::Rc,
};

use swipe_area::{
    Diagnostic, Direction, Point, RecognizerId, RejectReason, SwipeConfig, SwipeOutput,
    SwipeRecognizer, SwipeSignal, SwipeStatus, TouchOwnershipRegistry, TouchPoint,
    TouchPointState, TouchRegistry, TouchSnapshot,
};

const TRACE_HEADER: &str = "swipe_trace,ms,id,state,x,y,scene_x,scene_y";
const TRACE_HEADER_SHORT: &str = "swipe_trace,ms,id,state,x,y";

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let mut trace_path: Option<PathBuf> = None;
    let mut expect_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut direction: Option<Direction> = None;

    let mut idx = 1usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--expect" => {
                idx += 1;
                let Some(path) = args.get(idx) else {
                    return Err("missing path after --expect".into());
                };
                expect_path = Some(PathBuf::from(path));
            }
            "--config" => {
                idx += 1;
                let Some(path) = args.get(idx) else {
                    return Err("missing path after --config".into());
                };
                config_path = Some(PathBuf::from(path));
            }
            "--direction" => {
                idx += 1;
                let Some(label) = args.get(idx) else {
                    return Err("missing value after --direction".into());
                };
                direction = Some(
                    Direction::from_label(label)
                        .ok_or_else(|| format!("unknown direction: {label}"))?,
                );
            }
            "-h" | "--help" => {
                println!("{}", usage());
                return Ok(());
            }
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

    let trace_path = trace_path.ok_or_else(usage)?;
    let mut config = match config_path {
        Some(path) => SwipeConfig::from_path(&path).map_err(|e| e.to_string())?,
        None => SwipeConfig::default(),
    };
    if let Some(direction) = direction {
        config.direction = direction;
    }

    let frames = parse_trace(&trace_path)?;
    let outputs = replay(config, &frames);

    println!("signal,ms,kind,value");
    let mut statuses: Vec<&'static str> = Vec::new();
    for (ms, output) in &outputs {
        for signal in output.signals.iter() {
            let (kind, value) = describe_signal(signal);
            println!("signal,{ms},{kind},{value}");
            if let SwipeSignal::StatusChanged(status) = signal {
                statuses.push(status.label());
            }
        }
        if output.trace.reject_reason != RejectReason::None {
            println!("signal,{ms},reject,{}", output.trace.reject_reason.label());
        }
    }

    if let Some(expect_path) = expect_path {
        let expected = parse_expected_statuses(&expect_path)?;
        if statuses != expected {
            eprintln!("expected statuses: {}", expected.join(","));
            eprintln!("actual statuses:   {}", statuses.join(","));
            return Err("status sequence mismatch".into());
        }
    }

    Ok(())
}

fn usage() -> String {
    "usage: swipe_replay <trace.csv> [--direction <name>] [--config swipe.toml] [--expect expected_statuses.txt]"
        .to_string()
}

/// Drives one recognizer covering the whole trace area through an in-process registry.
fn replay(config: SwipeConfig, frames: &[TouchSnapshot]) -> Vec<(u64, SwipeOutput)> {
    let registry = Rc::new(TouchRegistry::new());
    let handle: Rc<dyn TouchOwnershipRegistry> = registry.clone();
    let mut swipe = SwipeRecognizer::new(RecognizerId(1), config, handle);

    let mut outputs = Vec::new();
    for frame in frames {
        for delivery in registry.route(frame, &[swipe.id()]) {
            outputs.push((frame.t_ms, swipe.handle(delivery.message)));
            for event in registry.take_ownership_events() {
                outputs.push((frame.t_ms, swipe.handle(event.message)));
            }
        }
    }

    // Let a candidate that was still undecided at the end of the capture time out.
    if let Some(last) = frames.last() {
        let tail_ms = last.t_ms.saturating_add(config.max_time_ms);
        outputs.push((tail_ms, swipe.advance_time(tail_ms)));
    }

    outputs
}

fn describe_signal(signal: &SwipeSignal) -> (&'static str, String) {
    match signal {
        SwipeSignal::StatusChanged(status) => ("status", status.label().to_string()),
        SwipeSignal::PressedChanged(pressed) => ("pressed", pressed.to_string()),
        SwipeSignal::DraggingChanged(dragging) => ("dragging", dragging.to_string()),
        SwipeSignal::TouchPositionChanged(point) => ("position", format_point(*point)),
        SwipeSignal::TouchScenePositionChanged(point) => {
            ("scene_position", format_point(*point))
        }
        SwipeSignal::DistanceChanged(distance) => ("distance", format!("{distance:.2}")),
        SwipeSignal::SceneDistanceChanged(distance) => {
            ("scene_distance", format!("{distance:.2}"))
        }
        SwipeSignal::Diagnostic(diagnostic) => ("diagnostic", describe_diagnostic(diagnostic)),
    }
}

fn describe_diagnostic(diagnostic: &Diagnostic) -> String {
    match diagnostic {
        Diagnostic::InvalidConfiguration {
            touch_id,
            violation,
        } => format!("invalid_configuration:{touch_id}:{violation}"),
        Diagnostic::TouchVanished { touch_id } => format!("touch_vanished:{touch_id}"),
        Diagnostic::PoolExhausted { evicted } => format!("pool_exhausted:{evicted}"),
    }
}

fn format_point(point: Point) -> String {
    format!("{:.2};{:.2}", point.x, point.y)
}

/// Reads `swipe_trace` rows; consecutive rows with the same `ms` form one frame.
fn parse_trace(path: &Path) -> Result<Vec<TouchSnapshot>, String> {
    let file = File::open(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let reader = BufReader::new(file);

    let mut frames: Vec<TouchSnapshot> = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line_result
            .map_err(|e| format!("failed to read {}:{}: {e}", path.display(), line_no))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if trimmed == TRACE_HEADER || trimmed == TRACE_HEADER_SHORT {
            continue;
        }

        let parts: Vec<&str> = trimmed.split(',').collect();
        if parts.len() < 6 {
            return Err(format!(
                "{}:{} invalid trace line, expected at least 6 columns",
                path.display(),
                line_no
            ));
        }
        if parts[0].trim() != "swipe_trace" {
            continue;
        }

        let ms = parse_u64(parts[1], path, line_no, "ms")?;
        let id = parse_u32(parts[2], path, line_no, "id")?;
        let state = parse_state(parts[3]).ok_or_else(|| {
            format!(
                "{}:{} invalid state '{}'",
                path.display(),
                line_no,
                parts[3].trim()
            )
        })?;
        let pos = Point::new(
            parse_f32(parts[4], path, line_no, "x")?,
            parse_f32(parts[5], path, line_no, "y")?,
        );
        let scene_pos = if parts.len() >= 8 {
            Point::new(
                parse_f32(parts[6], path, line_no, "scene_x")?,
                parse_f32(parts[7], path, line_no, "scene_y")?,
            )
        } else {
            pos
        };

        let point = TouchPoint::new(id, pos, scene_pos, state);
        match frames.last_mut() {
            Some(frame) if frame.t_ms == ms => frame.push(point),
            Some(frame) if frame.t_ms > ms => {
                return Err(format!(
                    "{}:{} timestamp {} goes backwards",
                    path.display(),
                    line_no,
                    ms
                ));
            }
            _ => frames.push(TouchSnapshot::new(ms).with_point(point)),
        }
    }

    Ok(frames)
}

fn parse_state(raw: &str) -> Option<TouchPointState> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pressed" => Some(TouchPointState::Pressed),
        "moved" => Some(TouchPointState::Moved),
        "stationary" => Some(TouchPointState::Stationary),
        "released" => Some(TouchPointState::Released),
        _ => None,
    }
}

fn parse_expected_statuses(path: &Path) -> Result<Vec<&'static str>, String> {
    let file = File::open(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let reader = BufReader::new(file);

    let mut statuses = Vec::new();
    for (line_no, line_result) in reader.lines().enumerate() {
        let line_no = line_no + 1;
        let line = line_result
            .map_err(|e| format!("failed to read {}:{}: {e}", path.display(), line_no))?;
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }

        let status = normalize_status(token).ok_or_else(|| {
            format!(
                "{}:{} invalid expected status: {}",
                path.display(),
                line_no,
                token
            )
        })?;
        statuses.push(status.label());
    }

    Ok(statuses)
}

fn normalize_status(token: &str) -> Option<SwipeStatus> {
    match token.trim().to_ascii_lowercase().as_str() {
        "waiting_for_touch" | "waiting" => Some(SwipeStatus::WaitingForTouch),
        "undecided" => Some(SwipeStatus::Undecided),
        "recognized" => Some(SwipeStatus::Recognized),
        _ => None,
    }
}

fn parse_u64(raw: &str, path: &Path, line_no: usize, field: &str) -> Result<u64, String> {
    raw.trim().parse::<u64>().map_err(|e| {
        format!(
            "{}:{} invalid {} '{}': {}",
            path.display(),
            line_no,
            field,
            raw.trim(),
            e
        )
    })
}

fn parse_u32(raw: &str, path: &Path, line_no: usize, field: &str) -> Result<u32, String> {
    raw.trim().parse::<u32>().map_err(|e| {
        format!(
            "{}:{} invalid {} '{}': {}",
            path.display(),
            line_no,
            field,
            raw.trim(),
            e
        )
    })
}

fn parse_f32(raw: &str, path: &Path, line_no: usize, field: &str) -> Result<f32, String> {
    raw.trim().parse::<f32>().map_err(|e| {
        format!(
            "{}:{} invalid {} '{}': {}",
            path.display(),
            line_no,
            field,
            raw.trim(),
            e
        )
    })
}
