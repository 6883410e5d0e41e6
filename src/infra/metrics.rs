// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records one CSV row per training batch.
//
// Columns:
//   epoch, batch        position in the run (both 0-based)
//   d_loss, d_acc       discriminator, averaged over real and fake
//   g_loss              weighted generator total
//   g_adv, g_pixel      the two generator terms before weighting
//
// Output file: models/metrics.csv
//
// Example CSV output:
//   epoch,batch,d_loss,d_acc,g_loss,g_adv,g_pixel
//   0,0,0.512300,0.480000,52.118000,0.931000,0.511870
//   0,1,0.301200,0.562500,48.007000,0.850100,0.471570
//
// Reading the curves:
//   - d_acc pinned at 100% means the generator has stopped fooling D
//   - g_pixel should trend down as translations sharpen

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

use crate::ml::trainer::{DiscriminatorReport, GeneratorReport};

const HEADER: &str = "epoch,batch,d_loss,d_acc,g_loss,g_adv,g_pixel";

/// One row of metrics for a single training batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMetrics {
    pub epoch:   usize,
    pub batch:   usize,
    pub d_loss:  f64,
    /// Fraction of patches on the right side of 0.5
    pub d_acc:   f64,
    pub g_loss:  f64,
    pub g_adv:   f64,
    pub g_pixel: f64,
}

impl BatchMetrics {
    pub fn new(
        epoch: usize,
        batch: usize,
        d:     DiscriminatorReport,
        g:     GeneratorReport,
    ) -> Self {
        Self {
            epoch,
            batch,
            d_loss:  d.loss,
            d_acc:   d.accuracy,
            g_loss:  g.loss,
            g_adv:   g.adversarial,
            g_pixel: g.pixel,
        }
    }
}

/// Appends batch metrics to a CSV file.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header if the file doesn't exist yet, so
    /// resumed runs keep appending to the same log.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let csv_path = dir.join("metrics.csv");

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one batch as a new row.
    pub fn log(&self, m: &BatchMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{},{:.6},{:.6},{:.6},{:.6},{:.6}",
            m.epoch, m.batch, m.d_loss, m.d_acc, m.g_loss, m.g_adv, m.g_pixel,
        )?;

        tracing::trace!("Logged epoch {} batch {}", m.epoch, m.batch);
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_row(batch: usize) -> BatchMetrics {
        BatchMetrics::new(
            1,
            batch,
            DiscriminatorReport { loss: 0.25, accuracy: 0.75 },
            GeneratorReport { loss: 10.5, adversarial: 0.5, pixel: 0.1 },
        )
    }

    #[test]
    fn test_header_then_rows() {
        let tmp    = TempDir::new().unwrap();
        let logger = MetricsLogger::new(tmp.path().display().to_string()).unwrap();
        logger.log(&sample_row(0)).unwrap();
        logger.log(&sample_row(1)).unwrap();

        let text: Vec<String> = fs::read_to_string(logger.csv_path())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        assert_eq!(text[0], HEADER);
        assert_eq!(text[1], "1,0,0.250000,0.750000,10.500000,0.500000,0.100000");
        assert_eq!(text.len(), 3);
    }

    #[test]
    fn test_reopening_appends_without_second_header() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().display().to_string();

        MetricsLogger::new(dir.clone()).unwrap().log(&sample_row(0)).unwrap();
        let logger = MetricsLogger::new(dir).unwrap();
        logger.log(&sample_row(1)).unwrap();

        let text = fs::read_to_string(logger.csv_path()).unwrap();
        assert_eq!(text.matches("epoch,").count(), 1);
        assert_eq!(text.lines().count(), 3);
    }
}
