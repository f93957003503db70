use kagami_types::RegionSlot;

#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("speaker region is not set")]
    SpeakerUnset,

    #[error("{0:?} region cannot be cleared")]
    NotClearable(RegionSlot),
}
