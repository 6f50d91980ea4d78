//! Stage orchestration for one render job.
//!
//! Ingest -> Normalize (parallel, input order kept) -> Overlay -> Sequence -> Audio -> Encode.
//! Every stage takes the previous stage's value and returns a new one. Job-scoped files live in
//! a [`JobWorkspace`] that is removed on every exit path.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use crate::audio::reconcile::{reconcile, target_sample_frames, write_f32le_file};
use crate::config::MontageConfig;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{AudioInputConfig, FrameSink, SinkConfig};
use crate::foundation::core::{CanvasFrame, FrameIndex};
use crate::foundation::error::{MontageError, MontageResult};
use crate::io::publish::{PublicRef, Publisher};
use crate::io::source::{LocalMediaSource, MediaHandle, MediaRef, MediaSource};
use crate::job::cancel::CancelToken;
use crate::job::report::{EntrySummary, JobReport, JobStage, StageTiming};
use crate::job::workspace::JobWorkspace;
use crate::media::asset::{LoadedAsset, MediaKind, load_asset};
use crate::media::audio::decode_audio_f32;
use crate::media::video_stream::VideoFrameStream;
use crate::normalize::canvas::normalize_frame;
use crate::normalize::plan::NormalizePlan;
use crate::overlay::text::CaptionRenderer;
use crate::overlay::title::build_title_layer;
use crate::overlay::watermark::{LogoOutcome, build_watermark_card};
use crate::sequence::entry::{CompositionEntry, EntryRole, EntrySource};
use crate::sequence::render::FrameProducer;
use crate::sequence::timeline::{Sequencer, Timeline};

/// Inputs of one render job.
#[derive(Clone, Debug, Default)]
pub struct RenderRequest {
    /// Media in playback order.
    pub media: Vec<MediaRef>,
    /// Title burned into the first entry. `None` or blank disables it.
    pub title: Option<String>,
    /// Background track. A missing file yields a silent output.
    pub audio: Option<PathBuf>,
    /// Display duration hint for still images, clamped by the timing policy.
    pub image_duration_hint: Option<f64>,
    /// Aborts this job only. Keep a clone to cancel from another thread; clones of the request
    /// share it, so give each job its own request.
    pub cancel: CancelToken,
}

/// A finished, committed output file owned by its job workspace.
///
/// The file stays available for repeated [`RenderedArtifact::publish`] attempts and is deleted
/// when the artifact is dropped.
#[derive(Debug)]
pub struct RenderedArtifact {
    path: PathBuf,
    report: JobReport,
    _workspace: JobWorkspace,
}

impl RenderedArtifact {
    /// Local path of the encoded MP4.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// What happened during the job.
    pub fn report(&self) -> &JobReport {
        &self.report
    }

    /// Hand the artifact to `publisher`. Safe to retry after a [`MontageError::Publish`].
    pub fn publish(&self, publisher: &dyn Publisher) -> MontageResult<PublicRef> {
        publisher.publish(&self.path)
    }
}

/// A timeline ready for frame production, together with the handles its entries decode from.
struct Composition {
    timeline: Timeline,
    _handles: Vec<MediaHandle>,
}

/// An acquired, classified media item.
struct Ingested {
    index: usize,
    kind: MediaKind,
    handle: MediaHandle,
}

/// Runs render jobs with one configuration.
///
/// The runner holds only configuration and collaborators. Everything a job mutates (workspace,
/// worker pool, report, cancellation) is created per call or carried by its [`RenderRequest`].
pub struct RenderJob {
    config: MontageConfig,
    source: Arc<dyn MediaSource>,
}

impl RenderJob {
    /// Job runner reading media from local paths and uploads.
    pub fn new(config: MontageConfig) -> Self {
        Self {
            config,
            source: Arc::new(LocalMediaSource),
        }
    }

    /// Use a different ingress collaborator.
    pub fn with_source(mut self, source: Arc<dyn MediaSource>) -> Self {
        self.source = source;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &MontageConfig {
        &self.config
    }

    /// Run the full pipeline and encode an MP4 inside a fresh job workspace.
    #[tracing::instrument(skip_all, fields(media = request.media.len()))]
    pub fn run(&self, request: &RenderRequest) -> MontageResult<RenderedArtifact> {
        self.config.validate()?;
        let workspace = JobWorkspace::create(self.config.temp_dir.as_deref())?;
        let out_path = workspace.file("output.mp4");
        let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out_path, self.config.output.clone()));
        let report = self.render_in(request, &workspace, &mut sink)?;
        drop(sink);
        tracing::info!(
            out = %out_path.display(),
            frames = report.total_frames,
            duration_secs = report.duration_secs,
            "render complete"
        );
        Ok(RenderedArtifact {
            path: out_path,
            report,
            _workspace: workspace,
        })
    }

    /// Run the full pipeline into an arbitrary sink. The workspace is gone when this returns.
    pub fn render_to_sink(
        &self,
        request: &RenderRequest,
        sink: &mut dyn FrameSink,
    ) -> MontageResult<JobReport> {
        self.config.validate()?;
        let workspace = JobWorkspace::create(self.config.temp_dir.as_deref())?;
        self.render_in(request, &workspace, sink)
    }

    /// Compose the timeline and render the single frame shown at `at_secs`.
    pub fn preview(
        &self,
        request: &RenderRequest,
        at_secs: f64,
    ) -> MontageResult<(CanvasFrame, JobReport)> {
        self.config.validate()?;
        let workspace = JobWorkspace::create(self.config.temp_dir.as_deref())?;
        let pool = self.build_pool()?;
        let mut report = JobReport::default();
        let composition = self.compose(request, &workspace, &pool, &mut report)?;
        let timeline = &composition.timeline;
        let last = timeline.total_frames().saturating_sub(1);
        let idx = timeline.fps().secs_to_frames_round(at_secs).min(last);
        let frame = FrameProducer::new(timeline, &pool, self.config.video_chunk_frames)
            .render_frame_at(FrameIndex(idx))?;
        Ok((frame, report))
    }

    fn build_pool(&self) -> MontageResult<rayon::ThreadPool> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers.unwrap_or(0))
            .thread_name(|i| format!("montage-worker-{i}"))
            .build()
            .map_err(|e| MontageError::Other(anyhow::anyhow!("failed to build worker pool: {e}")))
    }

    fn render_in(
        &self,
        request: &RenderRequest,
        workspace: &JobWorkspace,
        sink: &mut dyn FrameSink,
    ) -> MontageResult<JobReport> {
        let pool = self.build_pool()?;
        let mut report = JobReport::default();
        let composition = self.compose(request, workspace, &pool, &mut report)?;
        let timeline = &composition.timeline;

        let started = Instant::now();
        let audio = self.prepare_audio(request, timeline, workspace, &mut report)?;
        record(&mut report, JobStage::Audio, started);
        request.cancel.check()?;

        let started = Instant::now();
        sink.begin(SinkConfig {
            canvas: timeline.canvas(),
            fps: timeline.fps(),
            audio,
        })?;
        let stats = FrameProducer::new(timeline, &pool, self.config.video_chunk_frames)
            .render_all(sink, &request.cancel)?;
        request.cancel.check()?;
        sink.end()?;
        record(&mut report, JobStage::Encode, started);

        for (i, held) in stats.held_frames.iter().enumerate() {
            if *held > 0 {
                report.warn(
                    JobStage::Decode,
                    &MontageError::decode(format!(
                        "entry {i} ran out of source frames; last frame held for {held} frames"
                    )),
                );
            }
        }
        Ok(report)
    }

    /// Ingest, normalize, overlay and sequence.
    fn compose(
        &self,
        request: &RenderRequest,
        workspace: &JobWorkspace,
        pool: &rayon::ThreadPool,
        report: &mut JobReport,
    ) -> MontageResult<Composition> {
        let started = Instant::now();
        let ingested = self.ingest(request, workspace, report)?;
        record(report, JobStage::Ingest, started);
        request.cancel.check()?;

        let started = Instant::now();
        let mut entries = self.normalize(request, &ingested, pool, report)?;
        record(report, JobStage::Normalize, started);
        request.cancel.check()?;

        let started = Instant::now();
        let title_applied = self.apply_overlays(request, &mut entries, report)?;
        record(report, JobStage::Overlay, started);
        request.cancel.check()?;

        let started = Instant::now();
        let output = &self.config.output;
        let timeline = Sequencer::new(output.canvas, output.fps, &self.config.timing)
            .assemble(entries)?;
        record(report, JobStage::Sequence, started);

        report.entries = timeline
            .entries()
            .iter()
            .zip(timeline.spans())
            .enumerate()
            .map(|(i, (entry, span))| EntrySummary {
                role: entry.role,
                orientation: entry.orientation,
                duration_secs: entry.duration_secs,
                frames: span.len_frames(),
                fade_in_frames: span.fade_in_frames,
                has_title: title_applied && i == 0,
            })
            .collect();
        report.total_frames = timeline.total_frames();
        report.duration_secs = timeline.duration_secs();
        tracing::info!(
            entries = report.entries.len(),
            dropped = report.dropped.len(),
            total_frames = report.total_frames,
            "timeline ready"
        );

        Ok(Composition {
            timeline,
            _handles: ingested.into_iter().map(|i| i.handle).collect(),
        })
    }

    fn ingest(
        &self,
        request: &RenderRequest,
        workspace: &JobWorkspace,
        report: &mut JobReport,
    ) -> MontageResult<Vec<Ingested>> {
        let mut ingested = Vec::with_capacity(request.media.len());
        for (index, media) in request.media.iter().enumerate() {
            request.cancel.check()?;
            let file_name = media.file_name();
            let Some(kind) = MediaKind::from_file_name(&file_name) else {
                report.drop_asset(
                    index,
                    &file_name,
                    &MontageError::input(format!("unsupported media type '{file_name}'")),
                );
                continue;
            };
            match self.source.acquire(media, workspace.path()) {
                Ok(handle) => ingested.push(Ingested {
                    index,
                    kind,
                    handle,
                }),
                Err(e @ MontageError::Decode(_)) => report.drop_asset(index, &file_name, &e),
                Err(e) => return Err(e),
            }
        }
        if ingested.is_empty() {
            return Err(MontageError::input("no valid or supported media supplied"));
        }
        Ok(ingested)
    }

    fn normalize(
        &self,
        request: &RenderRequest,
        ingested: &[Ingested],
        pool: &rayon::ThreadPool,
        report: &mut JobReport,
    ) -> MontageResult<Vec<CompositionEntry>> {
        let results: Vec<MontageResult<CompositionEntry>> = pool.install(|| {
            ingested
                .par_iter()
                .map(|item| {
                    request.cancel.check()?;
                    self.normalize_one(item, request.image_duration_hint)
                })
                .collect()
        });

        let mut entries = Vec::with_capacity(results.len());
        for (item, result) in ingested.iter().zip(results) {
            match result {
                Ok(entry) => entries.push(entry),
                Err(e @ MontageError::Decode(_)) => {
                    report.drop_asset(item.index, item.handle.file_name(), &e)
                }
                Err(e) => return Err(e),
            }
        }
        if entries.is_empty() {
            return Err(MontageError::input("none of the supplied media could be decoded"));
        }
        Ok(entries)
    }

    fn normalize_one(
        &self,
        item: &Ingested,
        image_duration_hint: Option<f64>,
    ) -> MontageResult<CompositionEntry> {
        let cfg = &self.config;
        let loaded = load_asset(
            item.index,
            item.kind,
            item.handle.path(),
            image_duration_hint,
            &cfg.timing,
        )?;
        let asset = loaded.asset().clone();
        let plan = NormalizePlan::compute(asset.width, asset.height, cfg.output.canvas, &cfg.blur)?;
        let role = EntryRole::Content {
            asset_index: item.index,
        };
        tracing::debug!(
            index = item.index,
            kind = ?asset.kind,
            width = asset.width,
            height = asset.height,
            orientation = ?plan.orientation,
            duration_secs = asset.duration_secs,
            "normalizing asset"
        );

        match loaded {
            LoadedAsset::Image { pixels, .. } => {
                let frame = normalize_frame(&plan, pixels.rgba8_premul)?;
                Ok(CompositionEntry::still(
                    frame,
                    asset.duration_secs,
                    Some(plan.orientation),
                    role,
                ))
            }
            LoadedAsset::Video { info, .. } => {
                let fps = cfg.output.fps;
                let mut stream =
                    VideoFrameStream::open(&info, fps, 0.0, fps.frame_duration_secs() * 2.0)?;
                let first = stream.next_frame()?.ok_or_else(|| {
                    MontageError::decode(format!(
                        "video '{}' produced no frames",
                        asset.path.display()
                    ))
                })?;
                drop(stream);
                let poster = normalize_frame(&plan, first)?;
                Ok(CompositionEntry {
                    source: EntrySource::Video {
                        info: Arc::new(info),
                        plan: Arc::new(plan.clone()),
                        poster: Arc::new(poster),
                    },
                    duration_secs: asset.duration_secs,
                    orientation: Some(plan.orientation),
                    overlay: None,
                    role,
                })
            }
        }
    }

    /// Burn the title into entry 0 and append the watermark. Returns whether the title landed.
    fn apply_overlays(
        &self,
        request: &RenderRequest,
        entries: &mut Vec<CompositionEntry>,
        report: &mut JobReport,
    ) -> MontageResult<bool> {
        let cfg = &self.config;
        let title = request
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        if title.is_none() && !cfg.watermark.enabled {
            return Ok(false);
        }

        let mut renderer = match load_renderer(cfg) {
            Ok(r) => r,
            Err(e @ MontageError::Render(_)) => {
                report.warn(JobStage::Overlay, &e);
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let mut title_applied = false;
        if let Some(text) = title {
            let built = build_title_layer(&mut renderer, text, &cfg.title, cfg.output.canvas)
                .and_then(|layer| entries[0].with_overlay(layer));
            match built {
                Ok(entry) => {
                    entries[0] = entry;
                    title_applied = true;
                }
                Err(e @ MontageError::Render(_)) => report.warn(JobStage::Overlay, &e),
                Err(e) => return Err(e),
            }
        }

        if cfg.watermark.enabled {
            match build_watermark_card(&mut renderer, &cfg.watermark, cfg.output.canvas) {
                Ok(card) => {
                    match &card.logo {
                        LogoOutcome::Missing(path) => report.warn(
                            JobStage::Overlay,
                            &MontageError::render(format!(
                                "watermark logo '{path}' not found; text only"
                            )),
                        ),
                        LogoOutcome::Unreadable(reason) => report.warn(
                            JobStage::Overlay,
                            &MontageError::render(format!(
                                "watermark logo unreadable ({reason}); text only"
                            )),
                        ),
                        LogoOutcome::Drawn | LogoOutcome::NotConfigured => {}
                    }
                    entries.push(CompositionEntry::still(
                        card.frame,
                        cfg.watermark.duration_secs,
                        None,
                        EntryRole::Watermark,
                    ));
                }
                Err(e @ MontageError::Render(_)) => report.warn(JobStage::Overlay, &e),
                Err(e) => return Err(e),
            }
        }
        Ok(title_applied)
    }

    fn prepare_audio(
        &self,
        request: &RenderRequest,
        timeline: &Timeline,
        workspace: &JobWorkspace,
        report: &mut JobReport,
    ) -> MontageResult<Option<AudioInputConfig>> {
        let Some(path) = request.audio.as_deref() else {
            return Ok(None);
        };
        if !path.is_file() {
            report.warn(
                JobStage::Audio,
                &MontageError::input(format!(
                    "audio '{}' not found; output has no audio",
                    path.display()
                )),
            );
            return Ok(None);
        }

        let output = &self.config.output;
        let pcm = match decode_audio_f32(path, output.audio_sample_rate, output.audio_channels) {
            Ok(pcm) => pcm,
            Err(e @ MontageError::Decode(_)) => {
                report.warn(JobStage::Audio, &e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let target = target_sample_frames(
            timeline.total_frames(),
            timeline.fps(),
            output.audio_sample_rate,
        );
        let reconciled = match reconcile(pcm, target) {
            Ok(r) => r,
            Err(e @ MontageError::Decode(_)) => {
                report.warn(JobStage::Audio, &e);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        tracing::info!(action = ?reconciled.action, "audio reconciled");

        let pcm_path = workspace.file("audio.f32le");
        write_f32le_file(&reconciled.pcm.interleaved_f32, &pcm_path)?;
        report.audio = Some(reconciled.action);
        Ok(Some(AudioInputConfig {
            path: pcm_path,
            sample_rate: reconciled.pcm.sample_rate,
            channels: reconciled.pcm.channels,
        }))
    }
}

fn load_renderer(cfg: &MontageConfig) -> MontageResult<CaptionRenderer> {
    let path = cfg
        .resolve_font_path()
        .ok_or_else(|| MontageError::render("no usable font found; set font_path"))?;
    CaptionRenderer::from_font_file(&path)
}

fn record(report: &mut JobReport, stage: JobStage, started: Instant) {
    report.timings.push(StageTiming {
        stage,
        millis: started.elapsed().as_millis(),
    });
}
