use crate::store::TrackStore;
use crate::trackers::reid::simple_api::ReId;
use crate::trackers::reid::ReIdOptions;
use crate::utils::bbox::BoundingBox;
use crate::Errors;
use anyhow::Result;
use crossbeam::channel::Sender;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Frames between two progress reports
pub const DEFAULT_PROGRESS_STEP: usize = 1;

/// Shared flag to stop a running session from another thread
///
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress report of a session
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Frames processed so far
    pub processed: usize,
    /// Frames expected, when known
    pub total: Option<usize>,
}

impl Progress {
    /// Completed share in `[0, 1]`, `None` when the total is unknown
    ///
    pub fn fraction(&self) -> Option<f64> {
        match self.total {
            Some(0) => Some(1.0),
            Some(total) => Some((self.processed as f64 / total as f64).min(1.0)),
            None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Expected frame count, only used for progress fractions
    pub total_frames: Option<usize>,
    /// Progress is reported every `progress_step` frames and once at the end
    pub progress_step: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            total_frames: None,
            progress_step: DEFAULT_PROGRESS_STEP,
        }
    }
}

/// Runs a whole video through [`ReId`] and collects the persisted [`TrackStore`].
///
/// Frames are consumed strictly in order from any iterator, so a detector running on another
/// thread may feed the session through a `crossbeam` channel receiver.
///
pub struct ReIdSession {
    opts: ReIdOptions,
    rotate_amount: i64,
    session_opts: SessionOptions,
    progress: Option<Sender<Progress>>,
    cancellation: CancellationToken,
}

impl ReIdSession {
    /// # Parameters
    /// * `opts` - tracker tuning
    /// * `rotate_amount` - session rotation, stored alongside the tracks
    ///
    pub fn new(opts: ReIdOptions, rotate_amount: i64) -> Self {
        Self {
            opts,
            rotate_amount,
            session_opts: SessionOptions::default(),
            progress: None,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn session_options(mut self, session_opts: SessionOptions) -> Self {
        assert!(
            session_opts.progress_step > 0,
            "Progress step must be a positive number"
        );
        self.session_opts = session_opts;
        self
    }

    /// Channel receiving [`Progress`] reports
    ///
    pub fn progress(mut self, sender: Sender<Progress>) -> Self {
        self.progress = Some(sender);
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Token that cancels this session
    ///
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Tracks every frame of `detections`.
    ///
    /// # Errors
    /// * [`Errors::Cancelled`] when the token was cancelled before the last frame; the
    ///   partial store is dropped
    ///
    pub fn run<I>(mut self, detections: I) -> Result<TrackStore>
    where
        I: IntoIterator<Item = Vec<BoundingBox>>,
    {
        info!(
            "Tracking session started (rotation {}, expected frames {:?})",
            self.rotate_amount, self.session_opts.total_frames
        );

        let mut tracker = ReId::new(self.opts.clone());
        let mut store = TrackStore::new(self.rotate_amount);

        for frame in detections {
            if self.cancellation.is_cancelled() {
                let processed = store.len();
                info!("Tracking session cancelled after {} frames", processed);
                return Err(Errors::Cancelled { processed }.into());
            }

            store.push_frame(tracker.predict(&frame));

            if store.len() % self.session_opts.progress_step == 0 {
                self.report(store.len());
            }
        }

        if store.len() % self.session_opts.progress_step != 0 || store.is_empty() {
            self.report(store.len());
        }

        info!(
            "Tracking session finished: {} frames, {} tracks, frame width {}",
            store.len(),
            tracker.next_track_id(),
            tracker.options().frame_width
        );

        Ok(store)
    }

    fn report(&mut self, processed: usize) {
        let progress = Progress {
            processed,
            total: self.session_opts.total_frames,
        };
        if let Some(sender) = &self.progress {
            if let Err(e) = sender.send(progress) {
                warn!(
                    "Progress receiver is gone, further reports are dropped. Error is: {:?}",
                    e
                );
                self.progress = None;
            } else {
                debug!("Progress: {:?}", progress);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::trackers::reid::session::{
        CancellationToken, Progress, ReIdSession, SessionOptions,
    };
    use crate::trackers::reid::ReIdOptions;
    use crate::utils::bbox::BoundingBox;
    use crate::Errors;
    use std::thread;

    fn person(x: f64) -> BoundingBox {
        BoundingBox::new(x, 600.0, 100.0, 300.0)
    }

    fn walk(frames: usize) -> Vec<Vec<BoundingBox>> {
        (0..frames)
            .map(|f| vec![person(1000.0 + f as f64 * 10.0)])
            .collect()
    }

    #[test]
    fn fraction() {
        let p = Progress {
            processed: 5,
            total: Some(10),
        };
        assert_eq!(p.fraction(), Some(0.5));

        let p = Progress {
            processed: 12,
            total: Some(10),
        };
        assert_eq!(p.fraction(), Some(1.0));

        let p = Progress {
            processed: 3,
            total: None,
        };
        assert_eq!(p.fraction(), None);
    }

    #[test]
    fn detector_thread_feeds_session() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (det_sender, det_receiver) = crossbeam::channel::bounded(2);
        let (progress_sender, progress_receiver) = crossbeam::channel::unbounded();

        let producer = thread::spawn(move || {
            for frame in walk(10) {
                det_sender.send(frame).unwrap();
            }
        });

        let store = ReIdSession::new(ReIdOptions::new(3840), 320)
            .session_options(SessionOptions {
                total_frames: Some(10),
                progress_step: 3,
            })
            .progress(progress_sender)
            .run(det_receiver)
            .unwrap();
        producer.join().unwrap();

        assert_eq!(store.len(), 10);
        assert_eq!(store.rotate_amount(), 320);
        assert_eq!(store.track_ids(), vec![1]);

        let reports = progress_receiver.try_iter().collect::<Vec<_>>();
        let processed = reports.iter().map(|p| p.processed).collect::<Vec<_>>();
        assert_eq!(processed, vec![3, 6, 9, 10]);
        assert!(processed.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(reports.last().unwrap().fraction(), Some(1.0));
    }

    #[test]
    fn closed_progress_receiver_is_not_fatal() {
        let (progress_sender, progress_receiver) = crossbeam::channel::unbounded();
        drop(progress_receiver);
        let store = ReIdSession::new(ReIdOptions::new(3840), 0)
            .progress(progress_sender)
            .run(walk(4))
            .unwrap();
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn cancelled_before_run() {
        let token = CancellationToken::new();
        token.cancel();
        let err = ReIdSession::new(ReIdOptions::new(3840), 0)
            .cancellation(token)
            .run(walk(5))
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<Errors>(),
            Some(&Errors::Cancelled { processed: 0 })
        );
    }

    #[test]
    fn cancelled_mid_run() {
        let session = ReIdSession::new(ReIdOptions::new(3840), 0);
        let token = session.cancellation_token();
        let frames = walk(10).into_iter().enumerate().map(move |(i, f)| {
            if i == 3 {
                token.cancel();
            }
            f
        });
        let err = session.run(frames).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Errors>(),
            Some(&Errors::Cancelled { processed: 3 })
        );
    }
}
