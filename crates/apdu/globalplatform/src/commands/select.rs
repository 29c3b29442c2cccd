//! SELECT command (ISO 7816-4 / GlobalPlatform)

use nexum_apdu_macros::apdu_pair;

use crate::constants::{cla, ins, select_p1, select_p2, status};

apdu_pair! {
    /// SELECT command, used to select an application by its AID
    pub struct Select {
        command {
            cla: cla::ISO7816,
            ins: ins::SELECT,

            builders {
                /// Select an application by its AID
                pub fn with_aid(aid: impl Into<bytes::Bytes>) -> Self {
                    Self::new(select_p1::BY_NAME, select_p2::FIRST_OR_ONLY)
                        .with_data(aid.into())
                        .with_le(0)
                }
            }
        }

        response {
            ok {
                /// Application selected; payload is the File Control Information (FCI)
                #[sw(status::SW_NO_ERROR)]
                #[payload(field = "fci")]
                Success {
                    fci: Vec<u8>,
                }
            }

            errors {
                /// No application with the given AID is installed
                #[sw(status::SW_FILE_NOT_FOUND)]
                #[error("Application or file not found")]
                NotFound,

                /// Incorrect P1/P2 parameters
                #[sw(status::SW_INCORRECT_P1P2)]
                #[error("Incorrect P1/P2")]
                IncorrectP1P2,

                /// Wrong data (malformed AID)
                #[sw(status::SW_WRONG_DATA)]
                #[error("Wrong data")]
                WrongData,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexum_apdu_core::{ApduCommand, Response, StatusWord};

    const KEYCARD_AID: &[u8] = &[0xA0, 0x00, 0x00, 0x08, 0x04, 0x00, 0x01, 0x01];

    #[test]
    fn builds_select_by_name() {
        let cmd = SelectCommand::with_aid(KEYCARD_AID.to_vec());
        assert_eq!(cmd.class(), cla::ISO7816);
        assert_eq!(cmd.instruction(), ins::SELECT);
        assert_eq!(cmd.p1(), select_p1::BY_NAME);
        assert_eq!(cmd.p2(), select_p2::FIRST_OR_ONLY);
        assert_eq!(cmd.data(), Some(KEYCARD_AID));
        assert_eq!(cmd.expected_length(), Some(0));
    }

    #[test]
    fn parses_success_response_as_fci_payload() {
        let cmd = SelectCommand::with_aid(KEYCARD_AID.to_vec());
        let fci = vec![0xA4, 0x02, 0x8F, 0x00];
        let response = Response::new(Some(fci.clone().into()), StatusWord::new(0x90, 0x00));

        let ok = cmd.parse_response(response).unwrap();
        let SelectOk::Success { fci: parsed } = ok;
        assert_eq!(parsed, fci);
    }

    #[test]
    fn maps_file_not_found_status() {
        let cmd = SelectCommand::with_aid(KEYCARD_AID.to_vec());
        let response = Response::new(None, StatusWord::new(0x6A, 0x82));

        let err = cmd.parse_response(response).unwrap_err();
        assert!(matches!(err, SelectError::NotFound));
    }

    #[test]
    fn maps_unknown_status_to_catch_all() {
        let cmd = SelectCommand::with_aid(KEYCARD_AID.to_vec());
        let response = Response::new(None, StatusWord::new(0x6F, 0x00));

        let err = cmd.parse_response(response).unwrap_err();
        assert!(matches!(err, SelectError::Unknown { sw1: 0x6F, sw2: 0x00 }));
    }
}
