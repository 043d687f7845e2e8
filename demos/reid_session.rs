use anyhow::Result;
use gazexr::examples::{synthetic_session, PanoramicWalker};
use gazexr::gaze::intervals::{attention_intervals, DEFAULT_LENIENCY};
use gazexr::prelude::*;
use gazexr::store::DEFAULT_FRAME_TOLERANCE;
use gazexr::utils::panorama::unroll_x;
use log::info;
use std::thread;

const W: u32 = 3840;
const FRAMES: usize = 300;

fn main() -> Result<()> {
    env_logger::init();

    let width = W as f64;
    let mut walkers = vec![
        PanoramicWalker::new(BoundingBox::new(600.0, 700.0, 120.0, 340.0), 3.0, 2.0, width),
        PanoramicWalker::new(BoundingBox::new(1700.0, 720.0, 110.0, 320.0), -2.0, 2.0, width)
            .with_dropout(0.05),
        PanoramicWalker::new(BoundingBox::new(2600.0, 690.0, 130.0, 350.0), 1.0, 2.0, width),
    ];
    let detections = synthetic_session(&mut walkers, FRAMES);

    let centerer = PanoramicCenterer::new(W);
    let rotate_amount = centerer.rotate_amount(&detections[0])?;
    info!("Session rotation: {}", rotate_amount);

    let (det_sender, det_receiver) = crossbeam::channel::bounded(16);
    let (progress_sender, progress_receiver) = crossbeam::channel::unbounded::<Progress>();

    let detector = thread::spawn(move || {
        for frame in detections {
            // the tracker works in the rotated frame
            if det_sender
                .send(centerer.roll_frame(&frame, rotate_amount))
                .is_err()
            {
                break;
            }
        }
    });

    let reporter = thread::spawn(move || {
        for p in progress_receiver {
            if p.processed % 50 == 0 {
                eprintln!("Progress: {:.0}%", p.fraction().unwrap_or(0.0) * 100.0);
            }
        }
    });

    let store = ReIdSession::new(ReIdOptions::new(W), rotate_amount)
        .session_options(SessionOptions {
            total_frames: Some(FRAMES),
            progress_step: 10,
        })
        .progress(progress_sender)
        .run(det_receiver)?;

    detector.join().expect("Detector thread panicked");
    reporter.join().expect("Reporter thread panicked");

    eprintln!("Identities: {:?}", store.track_ids());

    let path = std::env::temp_dir().join("gazexr_tracks.json");
    store.save(&path)?;
    let store = TrackStore::load_checked(&path, FRAMES, DEFAULT_FRAME_TOLERANCE)?;

    // a participant watching the first person: the gaze follows its box, mapped back to the
    // unrotated capture space
    let correlator = GazeCorrelator::new(GazeCorrelatorOptions::default())?;
    let samples = store
        .frames()
        .iter()
        .enumerate()
        .filter_map(|(frame, records)| {
            let r = records.iter().find(|r| r.id == 1)?;
            let (cx, cy) = r.bbox.center();
            let x = unroll_x(cx, store.rotate_amount(), width);
            Some(GazeSample::new(frame, x * 1.5, cy * 1.5))
        })
        .collect::<GazeSamples>();

    let mut events = correlator.correlate(&store, &samples);
    sort_by_track(&mut events);
    for id in store.track_ids() {
        eprintln!(
            "Track {} watched during {:?}",
            id,
            attention_intervals(&events, id, DEFAULT_LENIENCY)
        );
    }

    Ok(())
}
