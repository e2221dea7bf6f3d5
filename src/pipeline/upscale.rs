use crate::arguments::Arguments;
use crate::error::Error;
use crate::model::{create_upscaler, FrameUpscaler};
use crate::progress::{StageBar, StageCounter};
use crate::tools::Tools;
use crate::workspace::Workspace;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, unbounded};

pub struct Upscale;

impl Upscale {
    const MAX_JOBS: usize = 6;

    pub fn execute(
        arguments: &Arguments,
        tools: &Tools,
        workspace: &Workspace,
    ) -> Result<(), Error> {
        let frames = workspace.frames()?;
        let total = frames.len() as u64;
        let upscaler = create_upscaler(
            tools,
            arguments.model,
            arguments.scale,
            arguments.pretend,
        );

        let bar = StageBar::new("Upscaling Frames", Some(total));
        let mut counter = StageCounter::new(Some(total));
        Self::run_pool(frames, &workspace.scaled_frames, upscaler, || {
            bar.update(&counter.advance());
        })?;

        bar.finish(&counter.finish());
        Ok(())
    }

    /// Runs every frame through at most `MAX_JOBS` concurrent workers. Each
    /// unit is picked up by exactly one worker; the first failure stops the
    /// run and is returned once the in-flight workers have wound down.
    fn run_pool(
        frames: Vec<PathBuf>,
        output_dir: &Path,
        upscaler: Arc<dyn FrameUpscaler>,
        mut on_unit_done: impl FnMut(),
    ) -> Result<(), Error> {
        let (work_sender, work_receiver) = unbounded::<(PathBuf, PathBuf)>();
        for input in frames {
            let file_name = input.file_name().ok_or(Error::InvalidInputPath)?;
            let output = output_dir.join(file_name);
            work_sender
                .send((input, output))
                .map_err(|_| Error::SendError)?;
        }
        drop(work_sender);

        let (result_sender, result_receiver) =
            bounded::<Result<(), Error>>(Self::MAX_JOBS);

        thread::scope(|scope| {
            for _ in 0..Self::MAX_JOBS {
                let work_receiver = work_receiver.clone();
                let result_sender = result_sender.clone();
                let upscaler = Arc::clone(&upscaler);
                scope.spawn(move || {
                    for (input, output) in work_receiver.iter() {
                        let result = upscaler.upscale(&input, &output);
                        let failed = result.is_err();
                        if result_sender.send(result).is_err() || failed {
                            break;
                        }
                    }
                });
            }
            drop(result_sender);
            drop(work_receiver);

            let mut outcome = Ok(());
            while let Ok(result) = result_receiver.recv() {
                match result {
                    Ok(()) => on_unit_done(),
                    Err(e) => {
                        outcome = Err(e);
                        break;
                    }
                }
            }
            // unblocks workers still sending, so the scope can join them
            drop(result_receiver);
            outcome
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Passthrough;
    use crate::workspace;
    use std::collections::BTreeSet;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    struct Recorder {
        seen: Mutex<Vec<PathBuf>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        fail_on: Option<&'static str>,
    }

    impl Recorder {
        fn new(fail_on: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                fail_on,
            })
        }
    }

    impl FrameUpscaler for Recorder {
        fn upscale(&self, input: &Path, _output: &Path) -> Result<(), Error> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(2));
            self.seen.lock().unwrap().push(input.to_path_buf());
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match self.fail_on {
                Some(name) if input.ends_with(name) => Err(Error::ExitCode {
                    program: "realesrgan-ncnn-vulkan".to_string(),
                    code: 255,
                }),
                _ => Ok(()),
            }
        }
    }

    fn fake_frames(count: usize) -> Vec<PathBuf> {
        (1..=count)
            .map(|i| PathBuf::from(format!("/frames/frame-{:08}.png", i)))
            .collect()
    }

    #[test]
    fn every_unit_is_attempted_exactly_once() {
        let recorder = Recorder::new(None);
        let mut completed = 0u64;
        Upscale::run_pool(
            fake_frames(40),
            Path::new("/scaled"),
            Arc::clone(&recorder) as Arc<dyn FrameUpscaler>,
            || completed += 1,
        )
        .unwrap();

        assert_eq!(completed, 40);
        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen.len(), 40);
        let unique: BTreeSet<_> = seen.iter().collect();
        assert_eq!(unique.len(), 40);
    }

    #[test]
    fn in_flight_units_never_exceed_the_ceiling() {
        let recorder = Recorder::new(None);
        Upscale::run_pool(
            fake_frames(64),
            Path::new("/scaled"),
            Arc::clone(&recorder) as Arc<dyn FrameUpscaler>,
            || {},
        )
        .unwrap();

        let peak = recorder.max_in_flight.load(Ordering::SeqCst);
        assert!(peak <= Upscale::MAX_JOBS, "peak concurrency was {}", peak);
        assert!(peak > 1, "pool never ran units concurrently");
    }

    #[test]
    fn first_failure_is_propagated() {
        let recorder = Recorder::new(Some("frame-00000013.png"));
        let result = Upscale::run_pool(
            fake_frames(30),
            Path::new("/scaled"),
            Arc::clone(&recorder) as Arc<dyn FrameUpscaler>,
            || {},
        );
        assert!(matches!(result, Err(Error::ExitCode { code: 255, .. })));
    }

    #[test]
    fn pretend_mode_round_trips_every_frame() {
        let source = workspace::create_temp_dir("source").unwrap();
        let scaled = workspace::create_temp_dir("scaled").unwrap();
        for i in 1..=9 {
            fs::write(
                source.join(format!("frame-{:08}.png", i)),
                format!("frame {}", i),
            )
            .unwrap();
        }

        let frames = workspace::list_frames(&source).unwrap();
        Upscale::run_pool(frames, &scaled, Arc::new(Passthrough), || {}).unwrap();

        let copied = workspace::list_frames(&scaled).unwrap();
        assert_eq!(copied.len(), 9);
        for frame in copied {
            let original = source.join(frame.file_name().unwrap());
            assert_eq!(fs::read(&frame).unwrap(), fs::read(original).unwrap());
        }
        workspace::remove_dir(&source);
        workspace::remove_dir(&scaled);
    }

    #[test]
    fn empty_frame_sets_complete_immediately() {
        let recorder = Recorder::new(None);
        let mut completed = 0u64;
        Upscale::run_pool(
            Vec::new(),
            Path::new("/scaled"),
            Arc::clone(&recorder) as Arc<dyn FrameUpscaler>,
            || completed += 1,
        )
        .unwrap();
        assert_eq!(completed, 0);
    }
}
