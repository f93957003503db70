//! Single-threaded overlay loop: input, editing, capture and job hand-off

use std::sync::Arc;
use std::time::{Duration, Instant};

use kagami_capture::{CaptureError, CaptureMode, Capturer, ConcatBuffer, OpacityCell, OverlaySurface};
use kagami_config::Config;
use kagami_core::region::text_band_rect;
use kagami_core::{CommandEdges, JobScheduler, RegionEditor, SelectionKind};
use kagami_translator::{JobImages, JobOutcome, JobReport, Persona, TranslationPipeline};
use kagami_types::{AppEvent, Command, JobId, Point, Rect, RegionSlot};
use kanal::{AsyncReceiver, AsyncSender};
use tokio_util::sync::CancellationToken;

use crate::status::{CANCELED, NO_TEXT, OverlayStatus};
use crate::topmost::{TopmostWindow, VisibilityEnforcer};
use crate::view::{FrameView, OverlayView, Renderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Overlay {
    editor: RegionEditor,
    capturer: Capturer,
    concat: ConcatBuffer,
    /// Job whose completion empties the concat buffer
    concat_consumer: Option<JobId>,
    scheduler: JobScheduler,
    pipeline: Option<Arc<TranslationPipeline>>,
    report_tx: AsyncSender<JobReport>,
    edges: CommandEdges<Command>,
    status: OverlayStatus,
    text_margin: i32,
    cursor: Point,
    surface: OpacityCell,
    window: Box<dyn TopmostWindow>,
    enforcer: VisibilityEnforcer,
    renderer: Box<dyn Renderer>,
}

impl Overlay {
    pub fn new(
        config: &Config,
        desktop: Rect,
        capturer: Capturer,
        pipeline: Option<TranslationPipeline>,
        report_tx: AsyncSender<JobReport>,
        window: Box<dyn TopmostWindow>,
        renderer: Box<dyn Renderer>,
    ) -> Self {
        let mut editor = RegionEditor::new(desktop, &config.region);
        editor.set_frame_visible(RegionSlot::Main, config.ui.show_main_frame);
        editor.set_frame_visible(RegionSlot::Speaker, config.ui.show_speaker_frame);
        Self {
            editor,
            capturer,
            concat: ConcatBuffer::from_config(&config.capture),
            concat_consumer: None,
            scheduler: JobScheduler::new(),
            pipeline: pipeline.map(Arc::new),
            report_tx,
            edges: CommandEdges::new(Duration::from_millis(config.debounce_ms)),
            status: OverlayStatus::new(&config.ui),
            text_margin: config.ui.text_margin,
            cursor: desktop.center(),
            surface: OpacityCell::default(),
            window,
            enforcer: VisibilityEnforcer::new(Duration::from_millis(config.enforce_topmost_ms)),
            renderer,
        }
    }

    pub fn status(&self) -> &OverlayStatus {
        &self.status
    }

    pub fn editor(&self) -> &RegionEditor {
        &self.editor
    }

    pub fn scheduler(&self) -> &JobScheduler {
        &self.scheduler
    }

    pub fn concat_len(&self) -> usize {
        self.concat.len()
    }

    pub fn handle_event(&mut self, event: AppEvent, now: Instant) -> Flow {
        match event {
            AppEvent::PointerMoved(p) => {
                self.cursor = p;
                self.editor.drag(p);
            }
            AppEvent::PointerPressed(p) => {
                self.cursor = p;
                // Hover may lag a tick behind the cursor
                self.editor.tick_hover(p);
                self.editor.press(p);
            }
            AppEvent::PointerReleased(p) => {
                self.cursor = p;
                if let Some(slot) = self.editor.release(p) {
                    tracing::info!(
                        "[OVERLAY] {:?} region now {:?}",
                        slot,
                        self.editor.region(slot).map(|r| r.bounds())
                    );
                }
            }
            AppEvent::CommandSample { command, down } => {
                if self.edges.sample(command, down, now) {
                    return self.handle_command(command);
                }
            }
            AppEvent::SetPersona { tone, speaker } => self.set_persona(Persona::new(speaker, tone)),
            AppEvent::Shutdown => return Flow::Quit,
        }
        Flow::Continue
    }

    pub fn handle_command(&mut self, command: Command) -> Flow {
        tracing::debug!("[OVERLAY] command {:?}", command);
        match command {
            Command::Translate => self.trigger_translate(),
            Command::Cancel => self.trigger_cancel(),
            Command::SelectMain => self.editor.start_selection(RegionSlot::Main),
            Command::SelectSpeaker => self.editor.start_selection(RegionSlot::Speaker),
            Command::ClearSpeaker => {
                self.editor.clear_speaker();
                self.status.show("(speaker region cleared)");
            }
            Command::TogglePolygonSelection => {
                let kind = match self.editor.selection_kind() {
                    SelectionKind::Rectangle => SelectionKind::Polygon,
                    SelectionKind::Polygon => SelectionKind::Rectangle,
                };
                self.editor.set_selection_kind(kind);
                self.status.show(format!("(selection: {kind:?})"));
            }
            Command::ConcatAppend => self.concat_append(),
            Command::ConcatClear => {
                self.concat.clear();
                self.concat_consumer = None;
                self.status.show("(concat cleared)");
            }
            Command::ToggleEditMain => self.toggle_edit(RegionSlot::Main),
            Command::ToggleEditSpeaker => self.toggle_edit(RegionSlot::Speaker),
            Command::ToggleCaptureMode => {
                let mode = self.capturer.settings_mut().toggle_mode();
                let label = match mode {
                    CaptureMode::Full => "FULL",
                    CaptureMode::ExcludeTextBand => "EXCLUDE",
                };
                self.status.show(format!("(CAPTURE={label})"));
            }
            Command::ToggleHideOnCapture => {
                let on = self.capturer.settings_mut().toggle_hide_on_capture();
                self.status.show(format!("(HIDE_ON_CAPTURE={})", if on { "ON" } else { "OFF" }));
            }
            Command::ToggleMainFrame => self.toggle_frame(RegionSlot::Main),
            Command::ToggleSpeakerFrame => self.toggle_frame(RegionSlot::Speaker),
            Command::FontSmaller => self.status.font_smaller(),
            Command::FontLarger => self.status.font_larger(),
            Command::AreaSmaller => {
                self.status.area_smaller();
                self.capturer.settings_mut().set_text_ratio(self.status.text_ratio);
            }
            Command::AreaLarger => {
                self.status.area_larger();
                self.capturer.settings_mut().set_text_ratio(self.status.text_ratio);
            }
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn toggle_edit(&mut self, slot: RegionSlot) {
        match self.editor.toggle_manual_edit(slot) {
            Ok(on) => tracing::info!("[OVERLAY] manual edit {:?}: {}", slot, on),
            Err(e) => {
                tracing::warn!("[OVERLAY] {}", e);
                self.status.show(format!("({e})"));
            }
        }
    }

    fn toggle_frame(&mut self, slot: RegionSlot) {
        let visible = !self.editor.frame_visible(slot);
        self.editor.set_frame_visible(slot, visible);
    }

    pub fn set_persona(&mut self, persona: Persona) {
        tracing::info!("[OVERLAY] persona: {:?}", persona);
        if let Some(pipeline) = self.pipeline.as_mut() {
            Arc::make_mut(pipeline).set_persona(persona);
        }
    }

    fn capture(&self, slot: RegionSlot) -> Result<Option<image::DynamicImage>, CaptureError> {
        let Some(region) = self.editor.region(slot) else {
            return Ok(None);
        };
        let surfaces: [&dyn OverlaySurface; 1] = [&self.surface];
        let frame = self.capturer.capture(slot, region, &surfaces)?;
        Ok(Some(frame.image))
    }

    fn concat_append(&mut self) {
        if self.status.busy {
            tracing::debug!("[OVERLAY] concat append ignored while busy");
            return;
        }
        let Some(region) = self.editor.region(RegionSlot::Main) else {
            return;
        };
        let surfaces: [&dyn OverlaySurface; 1] = [&self.surface];
        match self.capturer.capture(RegionSlot::Main, region, &surfaces) {
            Ok(frame) => {
                self.concat.push(frame);
                self.status
                    .show(format!("(concat {}/{})", self.concat.len(), self.concat.capacity()));
            }
            Err(e) => {
                tracing::error!("[OVERLAY] concat capture failed: {}", e);
                self.status.show(format!("(capture failed: {e})"));
            }
        }
    }

    /// Capture and start a job. Ignored while a job is active.
    pub fn trigger_translate(&mut self) {
        if self.status.busy {
            tracing::debug!("[OVERLAY] translate ignored while busy");
            return;
        }
        let Some(pipeline) = self.pipeline.clone() else {
            self.status.show("(no API key: set GEMINI_API_KEY)");
            return;
        };

        let use_concat = !self.concat.is_empty();
        let main = if use_concat {
            self.concat.compose()
        } else {
            self.capture(RegionSlot::Main)
                .and_then(|img| img.ok_or(CaptureError::EmptyBuffer))
        };
        let main = match main {
            Ok(img) => img,
            Err(e) => {
                tracing::error!("[OVERLAY] capture failed: {}", e);
                self.status.show(format!("(capture failed: {e})"));
                return;
            }
        };
        let speaker = match self.capture(RegionSlot::Speaker) {
            Ok(img) => img,
            Err(e) => {
                tracing::warn!("[OVERLAY] speaker capture failed, sending without hint: {}", e);
                None
            }
        };

        let ticket = self.scheduler.start();
        if use_concat {
            self.concat_consumer = Some(ticket.id());
        }
        self.status.set_busy(true);

        let tx = self.report_tx.clone();
        let images = JobImages { main, speaker };
        tokio::spawn(async move {
            let outcome = pipeline.run(&ticket, images).await;
            let report = JobReport {
                id: ticket.id(),
                outcome,
            };
            if let Err(e) = tx.send(report).await {
                tracing::debug!("[OVERLAY] report dropped, loop is gone: {}", e);
            }
        });
    }

    /// Cancel the active job; busy clears at once
    pub fn trigger_cancel(&mut self) {
        self.scheduler.cancel();
        self.status.set_busy(false);
        self.status.show(CANCELED);
        if self.concat_consumer.take().is_some() {
            self.concat.clear();
        }
    }

    /// Apply finished jobs; only the newest live report changes the text
    pub fn apply_reports(&mut self, reports: Vec<JobReport>) {
        let mut newest = None;
        for report in reports {
            if self.concat_consumer == Some(report.id) {
                self.concat.clear();
                self.concat_consumer = None;
            }
            if self.scheduler.is_live(report.id) {
                newest = Some(report);
            } else {
                tracing::debug!("[OVERLAY] discarding stale report {}", report.id);
            }
        }
        let Some(report) = newest else {
            return;
        };

        match report.outcome {
            JobOutcome::Succeeded(result) => {
                let text = result.display_text();
                self.status
                    .show(if text.is_empty() { NO_TEXT.to_string() } else { text.to_string() });
                self.status.source = result.source;
            }
            JobOutcome::Canceled => {}
            JobOutcome::Failed(e) => self.status.show(format!("(translation failed: {})", e.short())),
        }
        self.status.set_busy(false);
    }

    /// One loop step: drain reports, refresh hover, animate, raise, render
    pub fn tick(&mut self, now: Instant, reports: &AsyncReceiver<JobReport>) {
        let mut drained = Vec::new();
        loop {
            match reports.try_recv() {
                Ok(Some(report)) => drained.push(report),
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("[OVERLAY] report channel closed: {}", e);
                    break;
                }
            }
        }
        if !drained.is_empty() {
            self.apply_reports(drained);
        }

        self.editor.tick_hover(self.cursor);
        self.status.tick_dots();
        self.enforcer.tick(now, self.window.as_ref());
        let view = self.view();
        self.renderer.render(&view);
    }

    pub fn view(&self) -> OverlayView {
        let engine = self.editor.engine();
        let frames = RegionSlot::ORDER
            .into_iter()
            .filter_map(|slot| {
                let region = self.editor.region(slot)?;
                let bounds = region.bounds();
                let handles = if self.editor.handles_visible(slot) {
                    engine.drawn_handles(&bounds).to_vec()
                } else {
                    Vec::new()
                };
                Some(FrameView {
                    slot,
                    bounds,
                    outline: region.polygon().map(|p| p.points().to_vec()),
                    visible: self.editor.frame_visible(slot),
                    handles,
                })
            })
            .collect();
        OverlayView {
            frames,
            hover: self.editor.hover(),
            darkened: self.editor.darkened(),
            input_transparent: self.editor.input_transparent(),
            cursor: self.editor.cursor(),
            selection: self.editor.selection_preview(),
            text_band: text_band_rect(
                &self.editor.model().main().bounds(),
                self.text_margin,
                self.status.text_ratio,
            ),
            text: self.status.text.clone(),
            busy: self.status.busy,
            dots: self.status.dots,
            font_pt: self.status.font_pt,
            concat_frames: self.concat.len(),
            capture_mode: self.capturer.settings().mode(),
        }
    }
}

/// Drive `overlay` until quit or shutdown
pub async fn overlay_loop(
    mut overlay: Overlay,
    events: AsyncReceiver<AppEvent>,
    reports: AsyncReceiver<JobReport>,
    tick: Duration,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let mut interval = tokio::time::interval(tick);
    tracing::info!("[OVERLAY] Loop started ({:?} tick)", tick);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }
        let now = Instant::now();
        loop {
            let event = match events.try_recv() {
                Ok(Some(event)) => event,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("[OVERLAY] input channel closed: {}", e);
                    break;
                }
            };
            if overlay.handle_event(event, now) == Flow::Quit {
                tracing::info!("[OVERLAY] Quit requested");
                cancel.cancel();
                return Ok(());
            }
        }
        overlay.tick(now, &reports);
    }
    tracing::info!("[OVERLAY] Loop stopping");
    Ok(())
}
