use std::collections::BTreeSet;

use arstage_scene::{Collection, ContentId, ContentRegistry};

use crate::presentation::PresentationState;

/// Collections shown in `state`. Case-study cards are shown only once the
/// case-study content has been revealed.
pub fn declared_collections(state: PresentationState, cards_revealed: bool) -> Vec<Collection> {
    match state {
        PresentationState::Idle => vec![],
        PresentationState::Intro => vec![Collection::Avatar],
        PresentationState::Menu => vec![
            Collection::Avatar,
            Collection::MenuButtons,
            Collection::LinkButtons,
        ],
        PresentationState::ContentSequence => vec![
            Collection::Avatar,
            Collection::VideoSurfaces,
            Collection::BackButton,
            Collection::LinkButtons,
        ],
        PresentationState::CaseStudy => {
            let mut shown = vec![
                Collection::CaseStudyButtons,
                Collection::BackButton,
                Collection::LinkButtons,
            ];
            if cards_revealed {
                shown.push(Collection::CaseStudyCards);
            }
            shown
        }
        PresentationState::AboutUs => vec![
            Collection::Avatar,
            Collection::BackButton,
            Collection::LinkButtons,
        ],
    }
}

/// Object ids that must be visible in `state`.
pub fn declared_visible(
    registry: &ContentRegistry,
    state: PresentationState,
    cards_revealed: bool,
) -> BTreeSet<ContentId> {
    declared_collections(state, cards_revealed)
        .into_iter()
        .flat_map(|c| registry.collection(c).iter().cloned())
        .collect()
}

/// Make the registry's visibility exactly the declared set, hiding
/// everything else.
pub fn apply(registry: &mut ContentRegistry, state: PresentationState, cards_revealed: bool) {
    let shown = declared_visible(registry, state, cards_revealed);
    let ids: Vec<ContentId> = registry.objects().iter().map(|o| o.id.clone()).collect();
    for id in ids {
        let visible = shown.contains(&id);
        registry.set_visible(&id, visible);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_shows_nothing() {
        assert!(declared_collections(PresentationState::Idle, false).is_empty());
    }

    #[test]
    fn test_cards_only_when_revealed() {
        let hidden = declared_collections(PresentationState::CaseStudy, false);
        let shown = declared_collections(PresentationState::CaseStudy, true);
        assert!(!hidden.contains(&Collection::CaseStudyCards));
        assert!(shown.contains(&Collection::CaseStudyCards));
        assert!(shown.contains(&Collection::CaseStudyButtons));
        assert!(!declared_collections(PresentationState::Menu, true)
            .contains(&Collection::CaseStudyCards));
    }

    #[test]
    fn test_avatar_hidden_in_case_study() {
        assert!(!declared_collections(PresentationState::CaseStudy, true)
            .contains(&Collection::Avatar));
        assert!(declared_collections(PresentationState::AboutUs, false)
            .contains(&Collection::Avatar));
    }
}
