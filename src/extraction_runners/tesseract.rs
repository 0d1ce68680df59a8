//! OCR through the `tesseract` command line tool.
//!
//! Each call writes the image to a temporary PNG and runs
//! `tesseract <png> stdout --psm <mode> tsv`, then reads the word rows of the
//! TSV output back into a candidate with a mean confidence.

use std::io::{ErrorKind, Read};
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use image::ImageFormat;
use regex::Regex;

use crate::common::{NormalizedImage, PageSegMode, PipelineConfig, PlateCandidate};
use crate::error::ExtractionError;
use crate::extraction_runners::PlateTextExtractor;

const POLL_INTERVAL: Duration = Duration::from_millis(5);
// TSV row level of a single recognized word.
const WORD_LEVEL: &str = "5";

#[derive(Debug, Clone)]
pub struct TesseractCli {
    cmd: String,
    mode: PageSegMode,
    timeout: Duration,
}

impl TesseractCli {
    pub fn new(cmd: &str, mode: PageSegMode, timeout: Duration) -> Self {
        Self {
            cmd: cmd.to_string(),
            mode,
            timeout,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.tesseract_cmd, config.page_seg_mode, config.ocr_timeout())
    }

    /// Runs `tesseract --version` and returns the reported version string.
    pub fn version(&self) -> Result<String, ExtractionError> {
        let output = Command::new(&self.cmd)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ExtractionError::EngineUnavailable(format!("{}: {e}", self.cmd)))?;
        if !output.status.success() {
            return Err(ExtractionError::EngineUnavailable(format!(
                "{} --version exited with {}",
                self.cmd, output.status
            )));
        }

        // Older releases print the banner on stderr.
        let banner = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        let re = Regex::new(r"tesseract\s+v?(\d+(?:\.\d+)*)").map_err(|e| ExtractionError::Engine(e.to_string()))?;
        Ok(re
            .captures(&banner)
            .map(|c| c[1].to_string())
            .unwrap_or_else(|| "unknown".to_string()))
    }

    fn spawn(&self, png: &std::path::Path) -> Result<Child, ExtractionError> {
        Command::new(&self.cmd)
            .arg(png)
            .arg("stdout")
            .arg("--psm")
            .arg(self.mode.psm().to_string())
            .arg("tsv")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound | ErrorKind::PermissionDenied => {
                    ExtractionError::EngineUnavailable(format!("{}: {e}", self.cmd))
                }
                _ => ExtractionError::Engine(format!("failed to start {}: {e}", self.cmd)),
            })
    }
}

impl PlateTextExtractor for TesseractCli {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn extract(&self, image: &NormalizedImage) -> Result<PlateCandidate, ExtractionError> {
        let tmp = tempfile::Builder::new()
            .prefix("plate_")
            .suffix(".png")
            .tempfile()
            .map_err(|e| ExtractionError::Engine(format!("temp file: {e}")))?;
        image
            .save_with_format(tmp.path(), ImageFormat::Png)
            .map_err(|e| ExtractionError::Engine(format!("writing OCR input: {e}")))?;

        let child = self.spawn(tmp.path())?;
        let (stdout, stderr) = wait_with_timeout(child, self.timeout)?;
        if !stderr.trim().is_empty() {
            log::trace!("tesseract stderr: {}", stderr.trim());
        }
        Ok(parse_tsv(&stdout))
    }

    fn probe(&self) -> Result<(), ExtractionError> {
        let version = self.version()?;
        log::info!("Using tesseract {} at `{}` with {}", version, self.cmd, self.mode);
        Ok(())
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    std::thread::spawn(move || {
        let mut out = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut out);
        }
        out
    })
}

/// Waits for the child, killing it once `timeout` has passed.
fn wait_with_timeout(mut child: Child, timeout: Duration) -> Result<(String, String), ExtractionError> {
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());
    let started = Instant::now();

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if started.elapsed() >= timeout => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ExtractionError::Timeout(timeout));
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(ExtractionError::Engine(format!("waiting for tesseract: {e}"))),
        }
    };

    let stdout = stdout.join().unwrap_or_default();
    let stderr = stderr.join().unwrap_or_default();
    if !status.success() {
        return Err(ExtractionError::Engine(format!(
            "tesseract exited with {status}: {}",
            stderr.trim()
        )));
    }
    Ok((stdout, stderr))
}

/// Word rows (level 5) with a real confidence are joined with spaces; the
/// candidate confidence is their mean. No words gives an empty candidate.
pub(crate) fn parse_tsv(tsv: &str) -> PlateCandidate {
    let mut words = Vec::new();
    let mut conf_sum = 0.0f32;

    for row in tsv.lines().skip(1) {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 || cols[0] != WORD_LEVEL {
            continue;
        }
        let conf: f32 = match cols[10].trim().parse() {
            Ok(c) if c >= 0.0 => c,
            _ => continue,
        };
        let text = cols[11].trim();
        if text.is_empty() {
            continue;
        }
        words.push(text);
        conf_sum += conf;
    }

    if words.is_empty() {
        return PlateCandidate::empty();
    }
    let confidence = conf_sum / words.len() as f32;
    PlateCandidate::new(words.join(" ")).with_confidence(confidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    #[test]
    fn joins_words_and_averages_confidence() {
        let tsv = format!(
            "{HEADER}\n\
             1\t1\t0\t0\t0\t0\t0\t0\t416\t416\t-1\t\n\
             4\t1\t1\t1\t1\t0\t10\t150\t390\t90\t-1\t\n\
             5\t1\t1\t1\t1\t1\t10\t150\t180\t90\t91.5\tABC\n\
             5\t1\t1\t1\t1\t2\t210\t150\t190\t90\t88.5\t-123\n"
        );
        let candidate = parse_tsv(&tsv);
        assert_eq!(candidate.text, "ABC -123");
        assert_eq!(candidate.confidence, Some(90.0));
    }

    #[test]
    fn nothing_recognized_is_empty() {
        assert_eq!(parse_tsv(""), PlateCandidate::empty());
        let tsv = format!("{HEADER}\n1\t1\t0\t0\t0\t0\t0\t0\t416\t416\t-1\t\n");
        assert!(parse_tsv(&tsv).is_empty());
    }

    #[test]
    fn missing_binary_is_unavailable() {
        let engine = TesseractCli::new(
            "/nonexistent/tesseract-binary",
            PageSegMode::SingleWord,
            Duration::from_secs(1),
        );
        assert!(matches!(engine.probe(), Err(ExtractionError::EngineUnavailable(_))));

        let image = NormalizedImage::new(image::GrayImage::new(8, 8));
        let err = engine.extract(&image).unwrap_err();
        assert!(err.is_systemic());
    }

    #[cfg(unix)]
    mod scripted {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use std::path::Path;

        fn write_script(dir: &Path, name: &str, body: &str) -> String {
            let path = dir.join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.to_string_lossy().into_owned()
        }

        // A freshly written script can briefly fail with ETXTBSY while a
        // concurrent test forks; retry those spawns.
        fn extract_with(engine: &TesseractCli) -> Result<PlateCandidate, ExtractionError> {
            let image = NormalizedImage::new(image::GrayImage::new(8, 8));
            let mut result = engine.extract(&image);
            for _ in 0..5 {
                match &result {
                    Err(ExtractionError::Engine(msg)) if msg.contains("busy") => {
                        std::thread::sleep(Duration::from_millis(20));
                        result = engine.extract(&image);
                    }
                    _ => break,
                }
            }
            result
        }

        #[test]
        fn reads_tsv_from_stdout() {
            let dir = tempfile::tempdir().unwrap();
            let body = format!(
                "[ -f \"$1\" ] && [ \"$2\" = stdout ] && [ \"$3\" = --psm ] && [ \"$4\" = 7 ] && [ \"$5\" = tsv ] || exit 3\n\
                 printf '{}\\n5\\t1\\t1\\t1\\t1\\t1\\t10\\t150\\t180\\t90\\t87.5\\tXYZ789\\n'",
                HEADER.replace('\t', "\\t")
            );
            let cmd = write_script(dir.path(), "tesseract", &body);
            let engine = TesseractCli::new(&cmd, PageSegMode::SingleLine, Duration::from_secs(5));

            let candidate = extract_with(&engine).unwrap();
            assert_eq!(candidate.text, "XYZ789");
            assert_eq!(candidate.confidence, Some(87.5));
        }

        #[test]
        fn slow_engine_is_killed_at_timeout() {
            let dir = tempfile::tempdir().unwrap();
            let cmd = write_script(dir.path(), "tesseract", "exec sleep 5");
            let engine = TesseractCli::new(&cmd, PageSegMode::SingleWord, Duration::from_millis(100));

            let started = Instant::now();
            let err = extract_with(&engine).unwrap_err();
            assert!(matches!(err, ExtractionError::Timeout(_)));
            assert!(!err.is_systemic());
            assert!(started.elapsed() < Duration::from_secs(2));
        }

        #[test]
        fn failing_exit_is_an_engine_error() {
            let dir = tempfile::tempdir().unwrap();
            let cmd = write_script(dir.path(), "tesseract", "echo 'cannot read image' >&2\nexit 1");
            let engine = TesseractCli::new(&cmd, PageSegMode::SingleWord, Duration::from_secs(5));

            match extract_with(&engine) {
                Err(ExtractionError::Engine(msg)) => assert!(msg.contains("cannot read image")),
                other => panic!("expected engine error, got {other:?}"),
            }
        }
    }
}
