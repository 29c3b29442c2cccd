//! Constants used by the GlobalPlatform SELECT command
//!
//! Only the subset of the GlobalPlatform specification needed to select
//! an application (such as the Keycard applet) is covered here.

/// GlobalPlatform command classes
pub mod cla {
    /// ISO7816 command class
    pub const ISO7816: u8 = 0x00;
}

/// GlobalPlatform instruction codes
pub mod ins {
    /// SELECT command
    pub const SELECT: u8 = 0xA4;
}

/// Parameter values for SELECT command (P1)
pub mod select_p1 {
    /// Select by DF name (AID)
    pub const BY_NAME: u8 = 0x04;
}

/// Parameter values for SELECT command (P2)
pub mod select_p2 {
    /// First or only occurrence
    pub const FIRST_OR_ONLY: u8 = 0x00;
}

/// Commonly used status words in GlobalPlatform
pub mod status {
    use nexum_apdu_core::StatusWord;

    /// Success
    pub const SW_NO_ERROR: StatusWord = StatusWord::new(0x90, 0x00);
    /// Wrong data
    pub const SW_WRONG_DATA: StatusWord = StatusWord::new(0x6A, 0x80);
    /// Incorrect P1/P2
    pub const SW_INCORRECT_P1P2: StatusWord = StatusWord::new(0x6A, 0x86);
    /// Conditions of use not satisfied
    pub const SW_CONDITIONS_NOT_SATISFIED: StatusWord = StatusWord::new(0x69, 0x85);
    /// Security status not satisfied
    pub const SW_SECURITY_STATUS_NOT_SATISFIED: StatusWord = StatusWord::new(0x69, 0x82);
    /// Referenced data not found
    pub const SW_REFERENCED_DATA_NOT_FOUND: StatusWord = StatusWord::new(0x6A, 0x88);
    /// Not enough memory space / file full
    pub const SW_FILE_FULL: StatusWord = StatusWord::new(0x6A, 0x84);
    /// File or application not found
    pub const SW_FILE_NOT_FOUND: StatusWord = StatusWord::new(0x6A, 0x82);
}
