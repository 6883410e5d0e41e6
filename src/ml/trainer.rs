// ============================================================
// Layer 5 — Adversarial Training Loop
// ============================================================
// Two models, two optimisers, two update procedures:
//
//   discriminator_step
//     fake  = G(cond)                       (inference mode, no grad)
//     D ← D - ∇ MSE(D(cond, target), 1)     real pairs
//     D ← D - ∇ MSE(D(cond, fake),   0)     fake pairs
//     report 0.5 · (real + fake)
//
//   generator_step
//     D* = snapshot of D                    (read-only)
//     loss = 1 · MSE(D*(cond, G(cond)), 1) + 100 · MAE(G(cond), target)
//     G ← G - ∇ loss                        only G is stepped
//
// Targets are patch grids: every cell of the discriminator's
// output is scored on its own.
//
// Reference: Isola et al. (2017) Image-to-Image Translation
//            with Conditional Adversarial Networks

use anyhow::{ensure, Result};
use burn::{
    data::{dataloader::batcher::Batcher, dataset::Dataset},
    module::AutodiffModule,
    nn::loss::{MseLoss, Reduction},
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::Instant;

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{tensor_to_planes, PairBatch, PairBatcher},
    dataset::PairedDataset,
};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::{BatchMetrics, MetricsLogger},
    sample_sheet::{planes_to_images, SampleSheet, SheetRow},
};
use crate::ml::{
    discriminator::{Discriminator, DiscriminatorConfig},
    generator::{Generator, GeneratorConfig},
    TrainBackend,
};

/// Test pairs rendered per sample sheet
const SAMPLE_COUNT: usize = 3;

/// Relative weight of the two generator objectives
#[derive(Debug, Clone, Copy)]
pub struct LossWeights {
    pub adversarial: f64,
    pub pixel:       f64,
}

impl Default for LossWeights {
    fn default() -> Self {
        Self { adversarial: 1.0, pixel: 100.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscriminatorReport {
    pub loss:     f64,
    /// Fraction of patches classified on the right side of 0.5
    pub accuracy: f64,
}

impl DiscriminatorReport {
    fn average(real: Self, fake: Self) -> Self {
        Self {
            loss:     0.5 * (real.loss + fake.loss),
            accuracy: 0.5 * (real.accuracy + fake.accuracy),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorReport {
    /// Weighted total
    pub loss:        f64,
    pub adversarial: f64,
    pub pixel:       f64,
}

/// Owns both models and their optimisers.
pub struct GanTrainer<B, OG, OD>
where
    B:  AutodiffBackend,
    OG: Optimizer<Generator<B>, B>,
    OD: Optimizer<Discriminator<B>, B>,
{
    pub generator:        Generator<B>,
    pub discriminator:    Discriminator<B>,
    /// Read-only copy used by the generator step; its buffers are
    /// never shared with `discriminator`
    snapshot:             Discriminator<B>,
    optim_g:              OG,
    optim_d:              OD,
    lr:                   f64,
    weights:              LossWeights,
    device:               B::Device,
}

impl<B, OG, OD> GanTrainer<B, OG, OD>
where
    B:  AutodiffBackend,
    OG: Optimizer<Generator<B>, B>,
    OD: Optimizer<Discriminator<B>, B>,
{
    pub fn new(
        generator_config:     &GeneratorConfig,
        discriminator_config: DiscriminatorConfig,
        optim_g:              OG,
        optim_d:              OD,
        lr:                   f64,
        weights:              LossWeights,
        device:               &B::Device,
    ) -> Self {
        Self {
            generator:     generator_config.init(device),
            discriminator: discriminator_config.init(device),
            snapshot:      discriminator_config.init(device).no_grad(),
            optim_g,
            optim_d,
            lr,
            weights,
            device: device.clone(),
        }
    }

    /// Run the generator in inference mode: batch-norm uses its
    /// running statistics and nothing is recorded for backprop.
    pub fn translate(&self, input: Tensor<B::InnerBackend, 4>) -> Tensor<B::InnerBackend, 4> {
        self.generator.valid().forward(input)
    }

    /// One real-pair update followed by one fake-pair update.
    /// The generator is only read.
    pub fn discriminator_step(&mut self, batch: &PairBatch<B>) -> DiscriminatorReport {
        let fake = Tensor::<B, 4>::from_inner(self.translate(batch.input.clone().inner()));

        let grid       = self.patch_targets(batch);
        let valid      = Tensor::<B, 4>::ones(grid, &self.device);
        let fake_label = Tensor::<B, 4>::zeros(grid, &self.device);

        let real = self.update_discriminator(batch.input.clone(), batch.target.clone(), valid);
        let fake = self.update_discriminator(batch.input.clone(), fake, fake_label);

        DiscriminatorReport::average(real, fake)
    }

    /// One update of the generator through a read-only discriminator.
    pub fn generator_step(&mut self, batch: &PairBatch<B>) -> GeneratorReport {
        let frozen = self.frozen_discriminator();

        let fake   = self.generator.forward(batch.input.clone());
        let scores = frozen.forward(batch.input.clone(), fake.clone());
        let valid  = Tensor::<B, 4>::ones(scores.dims(), &self.device);

        let adversarial = MseLoss::new().forward(scores, valid, Reduction::Mean);
        let pixel       = (fake - batch.target.clone()).abs().mean();
        let loss = adversarial.clone() * self.weights.adversarial
                 + pixel.clone() * self.weights.pixel;

        let report = GeneratorReport {
            loss:        loss.clone().into_scalar().elem::<f64>(),
            adversarial: adversarial.into_scalar().elem::<f64>(),
            pixel:       pixel.into_scalar().elem::<f64>(),
        };

        // from_grads keeps only the generator's parameter gradients
        let grads = GradientsParams::from_grads(loss.backward(), &self.generator);
        self.generator = self.optim_g.step(self.lr, self.generator.clone(), grads);

        report
    }

    fn update_discriminator(
        &mut self,
        condition: Tensor<B, 4>,
        candidate: Tensor<B, 4>,
        target:    Tensor<B, 4>,
    ) -> DiscriminatorReport {
        let scores   = self.discriminator.forward(condition, candidate);
        let accuracy = patch_accuracy(scores.clone().detach(), target.clone());
        let loss     = MseLoss::new().forward(scores, target, Reduction::Mean);
        let value    = loss.clone().into_scalar().elem::<f64>();

        let grads = GradientsParams::from_grads(loss.backward(), &self.discriminator);
        self.discriminator = self.optim_d.step(self.lr, self.discriminator.clone(), grads);

        DiscriminatorReport { loss: value, accuracy }
    }

    /// Refresh the read-only snapshot from the live discriminator.
    /// Weights are loaded into the snapshot's own modules, so its
    /// running statistics never alias the original's.
    fn frozen_discriminator(&mut self) -> Discriminator<B> {
        let record = self.discriminator.clone().into_record();
        let frozen = self.snapshot.clone().load_record(record).no_grad();
        self.snapshot = frozen.clone();
        frozen
    }

    fn patch_targets(&self, batch: &PairBatch<B>) -> [usize; 4] {
        let [n, _, h, w] = batch.input.dims();
        let [c, ph, pw]  = DiscriminatorConfig::patch_grid(h, w);
        [n, c, ph, pw]
    }
}

/// Patch-wise binary accuracy with a 0.5 threshold.
fn patch_accuracy<B: Backend>(scores: Tensor<B, 4>, target: Tensor<B, 4>) -> f64 {
    let total: usize = scores.dims().iter().product();
    let correct = scores
        .greater_elem(0.5)
        .float()
        .equal(target.greater_elem(0.5).float())
        .int()
        .sum()
        .into_scalar()
        .elem::<i64>();
    correct as f64 / total.max(1) as f64
}

/// Datasets for one run
pub struct TrainingData {
    pub train: PairedDataset,
    pub test:  PairedDataset,
}

pub fn run_training(
    cfg:          &TrainConfig,
    data:         TrainingData,
    ckpt_manager: &CheckpointManager,
    metrics:      &MetricsLogger,
    sheet:        &SampleSheet,
) -> Result<()> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop::<TrainBackend>(cfg, data, ckpt_manager, metrics, sheet, &device)
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:          &TrainConfig,
    data:         TrainingData,
    ckpt_manager: &CheckpointManager,
    metrics:      &MetricsLogger,
    sheet:        &SampleSheet,
    device:       &B::Device,
) -> Result<()> {
    let n_batch = data.train.len() / cfg.batch_size;
    ensure!(
        n_batch > 0,
        "Training set has {} pairs, fewer than one batch of {}",
        data.train.len(),
        cfg.batch_size
    );
    ensure!(data.test.len() > 0, "Test set is empty; sample sheets need at least one pair");

    // ── Build models and optimisers ───────────────────────────────────────────
    let optim_cfg = AdamConfig::new()
        .with_beta_1(cfg.beta_1 as f32)
        .with_epsilon(1e-7);
    let mut trainer = GanTrainer::new(
        &cfg.generator_config(),
        cfg.discriminator_config(),
        optim_cfg.init(),
        optim_cfg.init(),
        cfg.lr,
        cfg.loss_weights(),
        device,
    );
    tracing::info!(
        "Models ready: gf={}, df={}, image {}x{}x{}",
        cfg.gf, cfg.df, cfg.channels, cfg.img_rows, cfg.img_cols
    );

    let shape          = cfg.image_shape();
    let train_batcher  = PairBatcher::<B>::new(device.clone(), shape);
    let sample_batcher = PairBatcher::<B::InnerBackend>::new(device.clone(), shape);
    let mut rng        = StdRng::seed_from_u64(cfg.seed);
    let start          = Instant::now();

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 0..cfg.epochs {
        for batch_i in 0..n_batch {
            let items = (0..cfg.batch_size)
                .filter_map(|_| data.train.get(rng.gen_range(0..data.train.len())))
                .collect();
            let batch = train_batcher.batch(items);

            let d = trainer.discriminator_step(&batch);
            let g = trainer.generator_step(&batch);

            println!(
                "[Epoch {}/{}] [Batch {}/{}] [D loss: {:.6}, acc: {:3}%] [G loss: {:.6}] time: {:.2?}",
                epoch, cfg.epochs,
                batch_i, n_batch,
                d.loss, (100.0 * d.accuracy) as i64,
                g.loss,
                start.elapsed(),
            );
            metrics.log(&BatchMetrics::new(epoch, batch_i, d, g))?;

            if batch_i % cfg.sample_interval == 0 {
                let path = cfg.sample_path(epoch, batch_i);
                sample_images(&trainer, &data.test, &sample_batcher, &mut rng, sheet, &path)?;
            }
            if batch_i % cfg.model_interval == 0 {
                ckpt_manager.save_models(&trainer.generator, &trainer.discriminator)?;
                tracing::info!("Checkpoint saved at epoch {} batch {}", epoch, batch_i);
            }
        }
    }

    tracing::info!("Training complete in {:.2?}", start.elapsed());
    Ok(())
}

/// Render Original / Generated / Target rows for a few random test pairs.
fn sample_images<B, OG, OD>(
    trainer: &GanTrainer<B, OG, OD>,
    test:    &PairedDataset,
    batcher: &PairBatcher<B::InnerBackend>,
    rng:     &mut StdRng,
    sheet:   &SampleSheet,
    path:    &std::path::Path,
) -> Result<()>
where
    B:  AutodiffBackend,
    OG: Optimizer<Generator<B>, B>,
    OD: Optimizer<Discriminator<B>, B>,
{
    let items = (0..SAMPLE_COUNT)
        .filter_map(|_| test.get(rng.gen_range(0..test.len())))
        .collect();
    let batch     = batcher.batch(items);
    let generated = trainer.translate(batch.input.clone());

    let mut rows = Vec::with_capacity(3);
    for (title, images) in [
        ("Original",  batch.input),
        ("Generated", generated),
        ("Target",    batch.target),
    ] {
        let (values, dims) = tensor_to_planes(images)?;
        rows.push(SheetRow::new(title, planes_to_images(&values, dims)?));
    }

    sheet.save(&rows, path)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use crate::data::dataset::{ImagePair, ImageShape, ImageStack};
    use ndarray::Array3;
    use tempfile::TempDir;

    type TestBackend = Autodiff<NdArray>;

    fn values<B: Backend, const D: usize>(t: Tensor<B, D>) -> Vec<f32> {
        t.into_data().to_vec::<f32>().unwrap()
    }

    fn trainer(
        device: &<TestBackend as Backend>::Device,
    ) -> GanTrainer<
        TestBackend,
        impl Optimizer<Generator<TestBackend>, TestBackend>,
        impl Optimizer<Discriminator<TestBackend>, TestBackend>,
    > {
        let optim = AdamConfig::new().with_beta_1(0.5);
        GanTrainer::new(
            &GeneratorConfig::new(1).with_filters(2),
            DiscriminatorConfig::new(1).with_filters(2),
            optim.init(),
            optim.init(),
            2e-4,
            LossWeights::default(),
            device,
        )
    }

    fn batch(device: &<TestBackend as Backend>::Device) -> PairBatch<TestBackend> {
        let batcher = PairBatcher::<TestBackend>::new(device.clone(), ImageShape::new(1, 32, 32));
        let items = (0..2)
            .map(|i| ImagePair {
                input:  (0..1024).map(|p| ((p + i * 7) % 13) as f32 / 6.5 - 1.0).collect(),
                target: (0..1024).map(|p| ((p * 3 + i) % 11) as f32 / 5.5 - 1.0).collect(),
            })
            .collect();
        batcher.batch(items)
    }

    fn norm_mean(d: &Discriminator<TestBackend>) -> Vec<f32> {
        values(d.blocks[1].norm.as_ref().unwrap().running_mean.value())
    }

    #[test]
    fn test_discriminator_step_reports_averages() {
        let device  = Default::default();
        let mut t   = trainer(&device);
        let report  = t.discriminator_step(&batch(&device));
        assert!(report.loss.is_finite());
        assert!((0.0..=1.0).contains(&report.accuracy));
    }

    #[test]
    fn test_discriminator_step_only_touches_discriminator() {
        let device = Default::default();
        let mut t  = trainer(&device);
        let b      = batch(&device);

        let g_before = values(t.generator.down[0].conv.weight.val());
        let d_before = values(t.discriminator.blocks[0].conv.weight.val());
        t.discriminator_step(&b);

        assert_eq!(values(t.generator.down[0].conv.weight.val()), g_before);
        assert_ne!(values(t.discriminator.blocks[0].conv.weight.val()), d_before);
    }

    #[test]
    fn test_generator_step_leaves_discriminator_read_only() {
        let device = Default::default();
        let mut t  = trainer(&device);
        let b      = batch(&device);

        let d_weights = values(t.discriminator.blocks[0].conv.weight.val());
        let d_stats   = norm_mean(&t.discriminator);
        let g_before  = values(t.generator.down[0].conv.weight.val());

        let report = t.generator_step(&b);

        assert_eq!(values(t.discriminator.blocks[0].conv.weight.val()), d_weights);
        assert_eq!(norm_mean(&t.discriminator), d_stats);
        assert_ne!(values(t.generator.down[0].conv.weight.val()), g_before);

        let expected = report.adversarial + 100.0 * report.pixel;
        assert!((report.loss - expected).abs() < 1e-3 * expected.max(1.0));
    }

    #[test]
    fn test_snapshot_tracks_discriminator_without_sharing_state() {
        let device = Default::default();
        let mut t  = trainer(&device);
        let b      = batch(&device);

        for _ in 0..2 {
            t.discriminator_step(&b);
            let frozen = t.frozen_discriminator();
            assert_eq!(
                values(frozen.blocks[0].conv.weight.val()),
                values(t.discriminator.blocks[0].conv.weight.val())
            );
            assert_eq!(norm_mean(&frozen), norm_mean(&t.discriminator));
            assert!(!frozen.blocks[0].conv.weight.is_require_grad());

            // A training-mode pass moves the snapshot's statistics only
            let d_stats = norm_mean(&t.discriminator);
            frozen.forward(b.input.clone(), b.target.clone());
            assert_eq!(norm_mean(&t.discriminator), d_stats);
        }
    }

    #[test]
    fn test_patch_accuracy_thresholds_at_half() {
        let device = Default::default();
        let scores = Tensor::<NdArray, 4>::from_data(
            burn::tensor::TensorData::new(vec![0.9f32, 0.2, 0.6, 0.4], [1, 1, 2, 2]),
            &device,
        );
        let target = Tensor::<NdArray, 4>::ones([1, 1, 2, 2], &device);
        assert!((patch_accuracy(scores, target) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_report_average_is_equal_weighting() {
        let avg = DiscriminatorReport::average(
            DiscriminatorReport { loss: 1.0, accuracy: 1.0 },
            DiscriminatorReport { loss: 3.0, accuracy: 0.0 },
        );
        assert_eq!(avg, DiscriminatorReport { loss: 2.0, accuracy: 0.5 });
    }

    #[test]
    fn test_train_loop_writes_checkpoints_samples_and_metrics() {
        let tmp = TempDir::new().unwrap();
        let stack = |offset: usize| {
            let arr = Array3::from_shape_fn((2, 32, 32), |(n, y, x)| ((n * 40 + y * 3 + x + offset) % 256) as u8);
            ImageStack::from_packed(&arr.into_dyn()).unwrap()
        };
        let data = TrainingData {
            train: PairedDataset::new(stack(0), stack(9)).unwrap(),
            test:  PairedDataset::new(stack(5), stack(1)).unwrap(),
        };

        let cfg = TrainConfig {
            checkpoint_dir:  tmp.path().join("models").display().to_string(),
            images_dir:      tmp.path().join("images").display().to_string(),
            dataset_name:    "unit".to_string(),
            img_rows:        32,
            img_cols:        32,
            gf:              2,
            df:              2,
            epochs:          1,
            batch_size:      1,
            sample_interval: 1,
            model_interval:  1,
            ..TrainConfig::default()
        };

        let ckpt    = CheckpointManager::new(&cfg.checkpoint_dir);
        let metrics = MetricsLogger::new(&cfg.checkpoint_dir).unwrap();
        let sheet   = SampleSheet::new(None);
        train_loop::<TestBackend>(&cfg, data, &ckpt, &metrics, &sheet, &Default::default()).unwrap();

        assert!(cfg.sample_path(0, 0).exists());
        assert!(cfg.sample_path(0, 1).exists());
        let rows = std::fs::read_to_string(metrics.csv_path()).unwrap();
        assert_eq!(rows.lines().count(), 3); // header + two batches

        let generator = ckpt
            .load_generator(cfg.generator_config().init::<NdArray>(&Default::default()), &Default::default());
        assert!(generator.is_ok());
    }

    #[test]
    fn test_train_loop_rejects_batch_larger_than_dataset() {
        let tmp = TempDir::new().unwrap();
        let arr = Array3::<u8>::zeros((1, 32, 32)).into_dyn();
        let ds  = PairedDataset::new(
            ImageStack::from_packed(&arr).unwrap(),
            ImageStack::from_packed(&arr).unwrap(),
        )
        .unwrap();
        let cfg = TrainConfig {
            img_rows:   32,
            img_cols:   32,
            batch_size: 4,
            ..TrainConfig::default()
        };
        let data = TrainingData { train: ds.clone(), test: ds };
        let ckpt = CheckpointManager::new(tmp.path().display().to_string());
        let metrics = MetricsLogger::new(tmp.path().display().to_string()).unwrap();

        let result = train_loop::<TestBackend>(&cfg, data, &ckpt, &metrics, &SampleSheet::new(None), &Default::default());
        assert!(result.is_err());
    }
}
