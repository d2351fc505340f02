//! Core data types for the switchless mod

/// Number of selectable console regions
pub const REGION_COUNT: usize = 3;

/// Console market configuration
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "std", derive(Hash))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Region {
    /// Europe (50Hz by default)
    Eu,
    /// North America
    Usa,
    /// Japan
    Japan,
}

impl Region {
    /// All regions in cycling order
    pub const ALL: [Region; REGION_COUNT] = [Region::Eu, Region::Usa, Region::Japan];

    /// Position of this region in the cycling order (also its stored byte)
    pub const fn index(&self) -> usize {
        match self {
            Region::Eu => 0,
            Region::Usa => 1,
            Region::Japan => 2,
        }
    }

    /// Look up a region by stored index
    pub const fn from_index(index: usize) -> Option<Region> {
        match index {
            0 => Some(Region::Eu),
            1 => Some(Region::Usa),
            2 => Some(Region::Japan),
            _ => None,
        }
    }

    /// 3-bit code for the region select lines (JP12/JP10/JP6, MSB first)
    pub const fn select_code(&self) -> u8 {
        match self {
            Region::Eu => 0b110,
            Region::Usa => 0b010,
            Region::Japan => 0b001,
        }
    }

    /// Video standard the console is switched to when this region is selected
    pub const fn default_video_standard(&self) -> VideoStandard {
        match self {
            Region::Eu => VideoStandard::Pal50,
            Region::Usa | Region::Japan => VideoStandard::Ntsc60,
        }
    }

    /// Compiled-in LED colour, used when the store holds no valid override
    pub const fn default_color(&self) -> LedColor {
        match self {
            Region::Eu => LedColor::Green,
            Region::Usa => LedColor::Orange,
            Region::Japan => LedColor::Red,
        }
    }

    /// Next region in cycling order, wrapping after the last one
    pub const fn next(&self) -> Region {
        match self {
            Region::Eu => Region::Usa,
            Region::Usa => Region::Japan,
            Region::Japan => Region::Eu,
        }
    }
}

/// Video timing selected on the console's VF line
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "std", derive(Hash))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VideoStandard {
    /// 50Hz, line low. Shown as one slow blink.
    Pal50,
    /// 60Hz, line high. Shown as three fast blinks.
    Ntsc60,
}

impl VideoStandard {
    /// Decode a stored flag. Only the least significant bit is meaningful.
    pub const fn from_bit(value: u8) -> VideoStandard {
        if value & 1 == 0 {
            VideoStandard::Pal50
        } else {
            VideoStandard::Ntsc60
        }
    }

    /// Flag value written to the store
    pub const fn as_bit(&self) -> u8 {
        match self {
            VideoStandard::Pal50 => 0,
            VideoStandard::Ntsc60 => 1,
        }
    }

    /// Logic level of the video standard line
    pub const fn is_high(&self) -> bool {
        matches!(self, VideoStandard::Ntsc60)
    }

    /// The other standard
    pub const fn toggled(&self) -> VideoStandard {
        match self {
            VideoStandard::Pal50 => VideoStandard::Ntsc60,
            VideoStandard::Ntsc60 => VideoStandard::Pal50,
        }
    }
}

/// Bi-colour LED state, as a 2-bit code on the red/green lines
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "std", derive(Hash))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedColor {
    Green,
    Red,
    Orange,
}

impl LedColor {
    /// Decode a colour code; only 1, 2 and 3 are valid
    pub const fn from_code(code: u8) -> Option<LedColor> {
        match code {
            0b01 => Some(LedColor::Green),
            0b10 => Some(LedColor::Red),
            0b11 => Some(LedColor::Orange),
            _ => None,
        }
    }

    /// 2-bit code (bit 1 = red, bit 0 = green)
    pub const fn code(&self) -> u8 {
        match self {
            LedColor::Green => 0b01,
            LedColor::Red => 0b10,
            LedColor::Orange => 0b11,
        }
    }
}

/// Per-region LED colours
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ColorTable([LedColor; REGION_COUNT]);

impl ColorTable {
    /// Table holding the compiled-in defaults
    pub const fn new() -> Self {
        Self([
            Region::Eu.default_color(),
            Region::Usa.default_color(),
            Region::Japan.default_color(),
        ])
    }

    /// Colour shown while `region` is selected
    pub fn color_for(&self, region: Region) -> LedColor {
        self.0[region.index()]
    }

    /// Apply a stored override byte. Invalid bytes leave the current colour
    /// untouched; returns whether the override was taken.
    pub fn apply_override(&mut self, region: Region, code: u8) -> bool {
        match LedColor::from_code(code) {
            Some(color) => {
                self.0[region.index()] = color;
                true
            }
            None => false,
        }
    }
}

impl Default for ColorTable {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory settings, mirrored to the persistent store
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Settings {
    /// Currently selected region
    pub region: Region,
    /// Current video standard; may differ from the region default
    pub video_standard: VideoStandard,
    /// LED colour per region
    pub colors: ColorTable,
}

impl Settings {
    /// Settings with the given region and its default standard
    pub const fn for_region(region: Region) -> Self {
        Self {
            region,
            video_standard: region.default_video_standard(),
            colors: ColorTable::new(),
        }
    }

    /// LED colour for the current region
    pub fn current_color(&self) -> LedColor {
        self.colors.color_for(self.region)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::for_region(Region::Eu)
    }
}

/// Outcome of one button interaction
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gesture {
    /// Line was not low after the debounce delay
    Bounce,
    /// Short press: console reset pulse issued
    ConsoleReset,
    /// Medium press: standard flipped and saved
    VideoStandardToggled(VideoStandard),
    /// Long press with at least one cycle step: region committed, console reset
    RegionChanged(Region),
    /// Long press released during the grace period
    RegionKept,
}

/// Button state machine states
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressState {
    /// Sleeping, waiting for a falling edge
    Idle,
    /// Edge seen, waiting for the line to settle
    Debounce,
    /// Press confirmed, timing the short/long split
    ShortHold,
    /// Still held after the split; LEDs darkened as feedback
    HoldFeedback,
    /// Showing the current region, giving time to release
    RegionGrace,
    /// Advancing regions while the button stays down
    Cycling {
        /// Number of regions advanced so far
        steps: u8,
    },
}
