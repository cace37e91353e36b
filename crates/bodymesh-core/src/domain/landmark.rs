//! Pose landmarks produced by the detection capability.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MeasureError;

/// The 33 body points reported by the pose detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPoint {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl BodyPoint {
    /// Number of points in a full detection.
    pub const COUNT: usize = 33;

    /// All points in detector index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Nose,
        Self::LeftEyeInner,
        Self::LeftEye,
        Self::LeftEyeOuter,
        Self::RightEyeInner,
        Self::RightEye,
        Self::RightEyeOuter,
        Self::LeftEar,
        Self::RightEar,
        Self::MouthLeft,
        Self::MouthRight,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftPinky,
        Self::RightPinky,
        Self::LeftIndex,
        Self::RightIndex,
        Self::LeftThumb,
        Self::RightThumb,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    /// Looks up a point by its detector index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Detector index of this point.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Snake-case name, matching the serialized form.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEyeInner => "left_eye_inner",
            Self::LeftEye => "left_eye",
            Self::LeftEyeOuter => "left_eye_outer",
            Self::RightEyeInner => "right_eye_inner",
            Self::RightEye => "right_eye",
            Self::RightEyeOuter => "right_eye_outer",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::MouthLeft => "mouth_left",
            Self::MouthRight => "mouth_right",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftPinky => "left_pinky",
            Self::RightPinky => "right_pinky",
            Self::LeftIndex => "left_index",
            Self::RightIndex => "right_index",
            Self::LeftThumb => "left_thumb",
            Self::RightThumb => "right_thumb",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
            Self::LeftHeel => "left_heel",
            Self::RightHeel => "right_heel",
            Self::LeftFootIndex => "left_foot_index",
            Self::RightFootIndex => "right_foot_index",
        }
    }
}

impl fmt::Display for BodyPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which photograph a landmark set was detected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Front,
    Side,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Front => f.write_str("front"),
            Self::Side => f.write_str("side"),
        }
    }
}

/// A single detected point, normalized to the image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position as a fraction of image width.
    pub x: f64,
    /// Vertical position as a fraction of image height (0.0 is the top edge).
    pub y: f64,
    /// Detector confidence that the point is visible (0.0 to 1.0).
    pub visibility: f64,
}

impl Landmark {
    #[must_use]
    pub const fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, visibility }
    }
}

/// A 2D point in normalized coordinates, used for midpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    /// Euclidean distance after stretching each axis by the image size.
    #[must_use]
    pub fn pixel_distance(self, other: Self, width: f64, height: f64) -> f64 {
        let dx = (self.x - other.x) * width;
        let dy = (self.y - other.y) * height;
        dx.hypot(dy)
    }

    /// Euclidean distance in normalized units.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl From<&Landmark> for Point2 {
    fn from(l: &Landmark) -> Self {
        Self { x: l.x, y: l.y }
    }
}

/// All landmarks detected in one image, plus that image's pixel size.
///
/// Distances are measured in true pixels so that non-square images do not
/// distort horizontal against vertical segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSet {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Detected points keyed by name.
    pub points: BTreeMap<BodyPoint, Landmark>,
}

impl LandmarkSet {
    /// Creates an empty set for an image of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            points: BTreeMap::new(),
        }
    }

    /// Builds a set from detector output in index order.
    ///
    /// Entries beyond the 33 known points are ignored.
    #[must_use]
    pub fn from_indexed(width: u32, height: u32, landmarks: &[Landmark]) -> Self {
        let points = landmarks
            .iter()
            .enumerate()
            .filter_map(|(i, l)| BodyPoint::from_index(i).map(|p| (p, *l)))
            .collect();
        Self {
            width,
            height,
            points,
        }
    }

    /// Adds or replaces a point.
    #[must_use]
    pub fn with(mut self, point: BodyPoint, landmark: Landmark) -> Self {
        self.points.insert(point, landmark);
        self
    }

    /// Returns true if the detector found no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Looks up a point, failing if the detector did not report it.
    ///
    /// # Errors
    ///
    /// Returns [`MeasureError::MissingLandmark`] when the point is absent.
    pub fn get(&self, point: BodyPoint) -> Result<&Landmark, MeasureError> {
        self.points
            .get(&point)
            .ok_or(MeasureError::MissingLandmark { point })
    }

    /// Point halfway between two landmarks.
    ///
    /// # Errors
    ///
    /// Returns an error if either landmark is missing.
    pub fn midpoint(&self, a: BodyPoint, b: BodyPoint) -> Result<Point2, MeasureError> {
        let a = self.get(a)?;
        let b = self.get(b)?;
        Ok(Point2 {
            x: (a.x + b.x) / 2.0,
            y: (a.y + b.y) / 2.0,
        })
    }

    /// Distance between two landmarks in pixels.
    ///
    /// # Errors
    ///
    /// Returns an error if either landmark is missing.
    pub fn pixel_distance(&self, a: BodyPoint, b: BodyPoint) -> Result<f64, MeasureError> {
        let a = Point2::from(self.get(a)?);
        let b = Point2::from(self.get(b)?);
        Ok(self.pixel_distance_between(a, b))
    }

    /// Distance between two arbitrary normalized points in pixels.
    #[must_use]
    pub fn pixel_distance_between(&self, a: Point2, b: Point2) -> f64 {
        a.pixel_distance(b, f64::from(self.width), f64::from(self.height))
    }

    /// Distance between two landmarks in normalized image units.
    ///
    /// # Errors
    ///
    /// Returns an error if either landmark is missing.
    pub fn normalized_distance(&self, a: BodyPoint, b: BodyPoint) -> Result<f64, MeasureError> {
        let a = Point2::from(self.get(a)?);
        let b = Point2::from(self.get(b)?);
        Ok(a.distance(b))
    }

    /// Same landmarks on an image whose sides are `factor` times larger.
    #[must_use]
    pub fn scaled(&self, factor: u32) -> Self {
        Self {
            width: self.width * factor,
            height: self.height * factor,
            points: self.points.clone(),
        }
    }
}
