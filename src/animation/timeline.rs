use std::time::Duration;

use cgmath::{Vector3, VectorSpace};

use crate::{
    animation::ease::Ease,
    data_structures::scene_graph::{NodeId, Scene},
};

/// One step of a timeline: move the target towards the given coordinates.
///
/// Axes left as `None` keep whatever value the previous step ended on.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tween {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub z: Option<f32>,
    /// Seconds; zero snaps the target at once.
    pub duration: f32,
    pub ease: Ease,
}

impl Tween {
    pub fn to() -> Self {
        Self::default()
    }

    pub fn x(mut self, x: f32) -> Self {
        self.x = Some(x);
        self
    }

    pub fn y(mut self, y: f32) -> Self {
        self.y = Some(y);
        self
    }

    pub fn z(mut self, z: f32) -> Self {
        self.z = Some(z);
        self
    }

    pub fn duration(mut self, seconds: f32) -> Self {
        self.duration = seconds.max(0.0);
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repeat {
    /// Extra passes after the first one.
    Count(u32),
    Infinite,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing { segment: usize, direction: Direction },
    Stopped,
    Finished,
}

#[derive(Clone, Debug)]
struct Segment {
    start_time: f32,
    duration: f32,
    from: Vector3<f32>,
    to: Vector3<f32>,
    ease: Ease,
}

impl Segment {
    fn end_time(&self) -> f32 {
        self.start_time + self.duration
    }
}

/// Sequential position tweens for one scene node.
///
/// Segments play back to back; with `yoyo` every second pass runs backwards.
/// Each segment starts where the previous one ended, so the timeline is fully
/// determined by the start position and the tweens.
#[derive(Clone, Debug)]
pub struct Timeline {
    target: NodeId,
    start: Vector3<f32>,
    segments: Vec<Segment>,
    repeat: Repeat,
    yoyo: bool,
    elapsed: f32,
    state: PlaybackState,
}

impl Timeline {
    pub fn new(target: NodeId, start: Vector3<f32>) -> Self {
        Self {
            target,
            start,
            segments: Vec::new(),
            repeat: Repeat::Count(0),
            yoyo: false,
            elapsed: 0.0,
            state: PlaybackState::Idle,
        }
    }

    pub fn to(mut self, tween: Tween) -> Self {
        let from = self.segments.last().map_or(self.start, |s| s.to);
        let to = Vector3::new(
            tween.x.unwrap_or(from.x),
            tween.y.unwrap_or(from.y),
            tween.z.unwrap_or(from.z),
        );
        self.segments.push(Segment {
            start_time: self.duration(),
            duration: tween.duration,
            from,
            to,
            ease: tween.ease,
        });
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.yoyo = yoyo;
        self
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Length of a single pass in seconds.
    pub fn duration(&self) -> f32 {
        self.segments.last().map_or(0.0, Segment::end_time)
    }

    /// Starts or resumes playback from the current elapsed time.
    pub fn play(&mut self) {
        if matches!(self.state, PlaybackState::Idle | PlaybackState::Stopped) {
            self.state = self.playing_at(self.elapsed);
        }
    }

    /// Halts playback; the target keeps its current position.
    pub fn stop(&mut self) {
        if let PlaybackState::Playing { .. } = self.state {
            self.state = PlaybackState::Stopped;
        }
    }

    /// Advances a playing timeline and returns the new target position.
    pub fn advance(&mut self, dt: Duration) -> Option<Vector3<f32>> {
        if !matches!(self.state, PlaybackState::Playing { .. }) {
            return None;
        }
        self.elapsed += dt.as_secs_f32();
        // endless timelines wrap so frame-sized steps stay representable
        if let (None, Some(cycle)) = (self.passes(), self.cycle()) {
            self.elapsed = self.elapsed.rem_euclid(cycle);
        }
        self.state = self.state_at(self.elapsed);
        Some(self.position_at(self.elapsed))
    }

    /// Advances and writes the new position into the target node.
    ///
    /// A target that was removed from the scene is skipped silently.
    pub fn tick(&mut self, dt: Duration, scene: &mut Scene) {
        if let Some(position) = self.advance(dt) {
            if let Some(node) = scene.get_mut(self.target) {
                node.local.position = position;
            }
        }
    }

    /// Position of the target `time` seconds after playback started.
    pub fn position_at(&self, time: f32) -> Vector3<f32> {
        let (_, local) = self.locate(time);
        self.evaluate(local)
    }

    fn passes(&self) -> Option<u64> {
        match self.repeat {
            Repeat::Count(n) => Some(n as u64 + 1),
            Repeat::Infinite => None,
        }
    }

    /// Seconds until playback repeats itself: one pass, or two with yoyo.
    fn cycle(&self) -> Option<f32> {
        let total = self.duration();
        if total <= 0.0 {
            return None;
        }
        Some(if self.yoyo { 2.0 * total } else { total })
    }

    /// Splits absolute time into (pass index, time within the pass).
    fn locate(&self, time: f32) -> (u64, f32) {
        let total = self.duration();
        if total <= 0.0 {
            return (0, 0.0);
        }
        let time = time.max(0.0);
        let (pass, local) = match self.passes() {
            Some(passes) if time >= passes as f32 * total => (passes - 1, total),
            _ => {
                let pass = (time / total).floor();
                (pass as u64, time - pass * total)
            }
        };
        if self.yoyo && pass % 2 == 1 {
            (pass, total - local)
        } else {
            (pass, local)
        }
    }

    fn evaluate(&self, local: f32) -> Vector3<f32> {
        let mut position = self.start;
        for segment in &self.segments {
            if local >= segment.end_time() {
                position = segment.to;
                continue;
            }
            if segment.duration > 0.0 && local > segment.start_time {
                let progress = segment.ease.apply((local - segment.start_time) / segment.duration);
                position = segment.from.lerp(segment.to, progress);
            }
            break;
        }
        position
    }

    fn state_at(&self, time: f32) -> PlaybackState {
        let total = self.duration();
        let finished = match self.passes() {
            Some(passes) => time >= passes as f32 * total,
            None => total <= 0.0,
        };
        if finished {
            PlaybackState::Finished
        } else {
            self.playing_at(time)
        }
    }

    fn playing_at(&self, time: f32) -> PlaybackState {
        let (pass, local) = self.locate(time);
        let direction = if self.yoyo && pass % 2 == 1 {
            Direction::Reverse
        } else {
            Direction::Forward
        };
        let segment = self
            .segments
            .iter()
            .position(|s| local < s.end_time())
            .unwrap_or(self.segments.len().saturating_sub(1));
        PlaybackState::Playing { segment, direction }
    }
}
