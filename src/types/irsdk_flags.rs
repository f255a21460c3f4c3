//! Constants for interpreting IRSDK bitfields
//!
//! Flag values for `SessionFlags` and `PitSvFlags`, each paired with the name
//! used on the wire.

/// Global session flags (`irsdk_Flags`)
pub mod session_flags {
    pub const CHECKERED: u32 = 0x0000_0001;
    pub const WHITE: u32 = 0x0000_0002;
    pub const GREEN: u32 = 0x0000_0004;
    pub const YELLOW: u32 = 0x0000_0008;
    pub const RED: u32 = 0x0000_0010;
    pub const BLUE: u32 = 0x0000_0020;
    pub const DEBRIS: u32 = 0x0000_0040;
    pub const CROSSED: u32 = 0x0000_0080;
    pub const YELLOW_WAVING: u32 = 0x0000_0100;
    pub const ONE_LAP_TO_GREEN: u32 = 0x0000_0200;
    pub const GREEN_HELD: u32 = 0x0000_0400;
    pub const TEN_TO_GO: u32 = 0x0000_0800;
    pub const FIVE_TO_GO: u32 = 0x0000_1000;
    pub const RANDOM_WAVING: u32 = 0x0000_2000;
    pub const CAUTION: u32 = 0x0000_4000;
    pub const CAUTION_WAVING: u32 = 0x0000_8000;
    // driver black flags
    pub const BLACK: u32 = 0x0001_0000;
    pub const DISQUALIFY: u32 = 0x0002_0000;
    pub const SERVICIBLE: u32 = 0x0004_0000;
    pub const FURLED: u32 = 0x0008_0000;
    pub const REPAIR: u32 = 0x0010_0000;
    // start lights
    pub const START_HIDDEN: u32 = 0x1000_0000;
    pub const START_READY: u32 = 0x2000_0000;
    pub const START_SET: u32 = 0x4000_0000;
    pub const START_GO: u32 = 0x8000_0000;

    /// Flag to wire name, in bit order.
    pub const NAMES: &[(u32, &str)] = &[
        (CHECKERED, "CHECKERED"),
        (WHITE, "WHITE"),
        (GREEN, "GREEN"),
        (YELLOW, "YELLOW"),
        (RED, "RED"),
        (BLUE, "BLUE"),
        (DEBRIS, "DEBRIS"),
        (CROSSED, "CROSSED"),
        (YELLOW_WAVING, "YELLOW_WAVED"),
        (ONE_LAP_TO_GREEN, "ONE_TO_GREEN"),
        (GREEN_HELD, "GREEN_HELD"),
        (TEN_TO_GO, "TEN_TO_GO"),
        (FIVE_TO_GO, "FIVE_TO_GO"),
        (RANDOM_WAVING, "RANDOM_WAVED"),
        (CAUTION, "CAUTION"),
        (CAUTION_WAVING, "CAUTION_WAVED"),
        (BLACK, "BLACK"),
        (DISQUALIFY, "DQ"),
        (SERVICIBLE, "SERVICEABLE"),
        (FURLED, "FURLED"),
        (REPAIR, "REPAIR"),
        (START_HIDDEN, "START_HIDDEN"),
        (START_READY, "START_READY"),
        (START_SET, "START_SET"),
        (START_GO, "START_GO"),
    ];
}

/// Pit services requested for the next stop (`irsdk_PitSvFlags`)
pub mod pit_service {
    pub const LF_TIRE_CHANGE: u32 = 0x0001;
    pub const RF_TIRE_CHANGE: u32 = 0x0002;
    pub const LR_TIRE_CHANGE: u32 = 0x0004;
    pub const RR_TIRE_CHANGE: u32 = 0x0008;
    pub const FUEL_FILL: u32 = 0x0010;
    pub const WINDSHIELD_TEAROFF: u32 = 0x0020;
    pub const FAST_REPAIR: u32 = 0x0040;

    /// Flag to wire name, in bit order.
    pub const NAMES: &[(u32, &str)] = &[
        (LF_TIRE_CHANGE, "LF_TIRE"),
        (RF_TIRE_CHANGE, "RF_TIRE"),
        (LR_TIRE_CHANGE, "LR_TIRE"),
        (RR_TIRE_CHANGE, "RR_TIRE"),
        (FUEL_FILL, "FUEL"),
        (WINDSHIELD_TEAROFF, "TEAROFF"),
        (FAST_REPAIR, "FAST_REPAIR"),
    ];
}
