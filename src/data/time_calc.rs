use std::time::Duration;

/// Per-stage wall time accumulated over a match pass.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct TimeCalc {
    n: usize,
    load: Duration,
    preprocess: Duration,
    extract: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Preprocess,
    Extract,
}

impl TimeCalc {
    pub fn add(&mut self, stage: Stage, x: Duration) {
        match stage {
            Stage::Load => {
                // Every record starts with a load, so this counts records.
                self.n += 1;
                self.load += x;
            }
            Stage::Preprocess => self.preprocess += x,
            Stage::Extract => self.extract += x,
        }
    }

    pub fn merge(&mut self, other: &TimeCalc) {
        self.n += other.n;
        self.load += other.load;
        self.preprocess += other.preprocess;
        self.extract += other.extract;
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn total(&self, stage: Stage) -> Duration {
        match stage {
            Stage::Load => self.load,
            Stage::Preprocess => self.preprocess,
            Stage::Extract => self.extract,
        }
    }

    pub fn avg(&self, stage: Stage) -> Duration {
        if self.n == 0 {
            return Duration::ZERO;
        }
        self.total(stage) / self.n as u32
    }

    pub fn summary(&self) -> String {
        format!(
            "> {} records | Load: {:?} avg | Preprocess: {:?} avg | OCR: {:?} avg",
            self.n,
            self.avg(Stage::Load),
            self.avg(Stage::Preprocess),
            self.avg(Stage::Extract),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_over_loaded_records() {
        let mut a = TimeCalc::default();
        a.add(Stage::Load, Duration::from_millis(4));
        a.add(Stage::Extract, Duration::from_millis(30));
        let mut b = TimeCalc::default();
        b.add(Stage::Load, Duration::from_millis(2));
        a.merge(&b);

        assert_eq!(a.n(), 2);
        assert_eq!(a.avg(Stage::Load), Duration::from_millis(3));
        assert_eq!(a.avg(Stage::Extract), Duration::from_millis(15));
        assert_eq!(TimeCalc::default().avg(Stage::Preprocess), Duration::ZERO);
    }
}
