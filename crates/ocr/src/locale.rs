use tally_core::LocaleProfile;

use crate::types::Line;

/// Pick the profile whose marker words appear on the most lines. Each marker
/// counts at most once per line; ties go to the earlier profile. A document
/// with no marker at all has no locale.
pub fn detect_locale<'a>(lines: &[Line], profiles: &'a [LocaleProfile]) -> Option<&'a LocaleProfile> {
    let upper: Vec<String> = lines.iter().map(|l| l.text.to_uppercase()).collect();

    let mut best: Option<(&LocaleProfile, usize)> = None;
    for profile in profiles {
        let hits: usize = profile
            .markers
            .iter()
            .map(|m| m.to_uppercase())
            .map(|m| upper.iter().filter(|line| line.contains(&m)).count())
            .sum();
        if best.map_or(true, |(_, top)| hits > top) {
            best = Some((profile, hits));
        }
    }
    best.filter(|&(_, hits)| hits > 0).map(|(p, _)| p)
}
