//! External hand detector running as a child process.
//!
//! The child owns the webcam and the landmark model and speaks the
//! JSON-lines format from [`hand_landmarks::wire`].  Its stdout is read on a
//! dedicated thread and handed to the frame loop over a channel, the same way
//! gesture events travel from their source thread to the app loop.

use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use hand_landmarks::wire::{decode_line, is_ready_line, DecodeOptions, READY_LINE};
use hand_landmarks::{DetectionResult, LandmarkSource, SourceError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// How to launch the detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorCommand {
    pub program:   String,
    pub args:      Vec<String>,
    /// Hands scored below this are dropped.
    pub min_score: f32,
}

impl Default for DetectorCommand {
    fn default() -> Self {
        DetectorCommand {
            program:   "python3".to_string(),
            args:      vec!["hand_detect.py".to_string()],
            min_score: 0.5,
        }
    }
}

impl DetectorCommand {
    /// Parse a whitespace-separated command line such as `"python3 hand_detect.py"`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(DetectorCommand { program, args: parts.collect(), ..DetectorCommand::default() })
    }

    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

type LineResult = Result<DetectionResult, SourceError>;

pub struct DetectorProcess {
    child:  Option<Child>,
    reader: Option<JoinHandle<()>>,
    rx:     Receiver<LineResult>,
    label:  String,
}

impl DetectorProcess {
    /// Start the child and wait for its `READY` line.
    pub fn spawn(cmd: &DetectorCommand, max_hands: usize) -> Result<Self, SourceError> {
        let acquire = |reason: String| SourceError::Acquire { what: "detector", reason };

        info!(command = %cmd.display(), max_hands, "starting hand detector");
        let mut child = Command::new(&cmd.program)
            .args(&cmd.args)
            .arg("--max-hands")
            .arg(max_hands.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| acquire(format!("{}: {e}", cmd.display())))?;

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            return Err(acquire("no stdout pipe".to_string()));
        };
        let mut stdout = BufReader::new(stdout);

        let mut ready = String::new();
        let handshake = stdout.read_line(&mut ready);
        if !matches!(handshake, Ok(n) if n > 0 && is_ready_line(&ready)) {
            let _ = child.kill();
            let _ = child.wait();
            return Err(acquire(format!("did not signal {READY_LINE:?}, got {:?}", ready.trim())));
        }
        info!("hand detector ready");

        let opts = DecodeOptions { max_hands, min_score: cmd.min_score };
        let (tx, rx) = mpsc::channel();
        let reader = thread::spawn(move || read_frames(stdout, opts, tx));

        Ok(DetectorProcess {
            child:  Some(child),
            reader: Some(reader),
            rx,
            label:  format!("detector ({})", cmd.program),
        })
    }
}

/// Reader thread: one decoded frame per line until EOF.
fn read_frames(stdout: BufReader<ChildStdout>, opts: DecodeOptions, tx: mpsc::Sender<LineResult>) {
    for line in stdout.lines() {
        let frame = match line {
            Ok(l) if l.trim().is_empty() => continue,
            Ok(l)  => decode_line(&l, opts).map(|f| f.result),
            Err(e) => Err(SourceError::Io(e)),
        };
        if tx.send(frame).is_err() { return; }
    }
    debug!("detector stdout closed");
}

impl LandmarkSource for DetectorProcess {
    fn name(&self) -> &str { &self.label }

    /// Block for the next frame, then skip ahead to the newest one queued so
    /// a slow window never lags behind the camera.
    fn detect(&mut self, _timestamp: Instant) -> Result<DetectionResult, SourceError> {
        let mut latest = self.rx.recv().map_err(|_| SourceError::Disconnected)??;
        loop {
            match self.rx.try_recv() {
                Ok(frame)                       => latest = frame?,
                Err(TryRecvError::Empty)        => return Ok(latest),
                Err(TryRecvError::Disconnected) => return Ok(latest),
            }
        }
    }

    /// The camera belongs to the child; stopping it frees the device.
    fn release_camera(&mut self) -> Result<(), SourceError> {
        let Some(child) = self.child.as_mut() else { return Ok(()) };
        if child.try_wait()?.is_some() {
            return Ok(());
        }
        child.kill().map_err(|e| SourceError::Release { what: "camera", reason: e.to_string() })
    }

    /// Reap the child and join the reader thread.
    fn close(&mut self) -> Result<(), SourceError> {
        if let Some(mut child) = self.child.take() {
            if child.try_wait()?.is_none() {
                let _ = child.kill();
            }
            let status = child.wait()
                .map_err(|e| SourceError::Release { what: "detector", reason: e.to_string() })?;
            debug!(%status, "detector exited");
        }
        if let Some(reader) = self.reader.take() {
            if reader.join().is_err() {
                warn!("detector reader thread panicked");
            }
        }
        Ok(())
    }
}

impl Drop for DetectorProcess {
    fn drop(&mut self) {
        if let Some(child) = self.child.as_mut() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_command_line() {
        let cmd = DetectorCommand::parse("  python3 hand_detect.py --camera 1 ").unwrap();
        assert_eq!(cmd.program, "python3");
        assert_eq!(cmd.args, vec!["hand_detect.py", "--camera", "1"]);
        assert_eq!(cmd.display(), "python3 hand_detect.py --camera 1");
        assert!(DetectorCommand::parse("   ").is_none());
    }

    #[test]
    fn missing_program_is_acquire_error() {
        let cmd = DetectorCommand {
            program: "/nonexistent/hand-detector".to_string(),
            args:    vec![],
            ..DetectorCommand::default()
        };
        assert!(matches!(
            DetectorProcess::spawn(&cmd, 1),
            Err(SourceError::Acquire { what: "detector", .. })
        ));
    }

    #[cfg(unix)]
    fn sh(script: &str) -> DetectorCommand {
        // `sh -c SCRIPT --max-hands N`: the extra args land in $0/$1 and are ignored.
        DetectorCommand {
            program:   "sh".to_string(),
            args:      vec!["-c".to_string(), script.to_string()],
            min_score: 0.0,
        }
    }

    #[cfg(unix)]
    #[test]
    fn no_ready_line_is_acquire_error() {
        assert!(matches!(
            DetectorProcess::spawn(&sh("echo hello"), 1),
            Err(SourceError::Acquire { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn streams_frames_then_disconnects() {
        let script = r#"echo READY; echo '{"hands":[]}'"#;
        let mut det = DetectorProcess::spawn(&sh(script), 1).unwrap();
        assert!(det.detect(Instant::now()).unwrap().is_empty());
        assert!(matches!(det.detect(Instant::now()), Err(SourceError::Disconnected)));
        det.release_camera().unwrap();
        det.close().unwrap();
        // Idempotent.
        det.release_camera().unwrap();
        det.close().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn malformed_line_surfaces_as_error() {
        let mut det = DetectorProcess::spawn(&sh("echo READY; echo garbage; exec sleep 5"), 1).unwrap();
        assert!(matches!(det.detect(Instant::now()), Err(SourceError::Malformed(_))));
        det.release_camera().unwrap();
        det.close().unwrap();
    }
}
