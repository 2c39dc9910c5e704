//! Demo data applied at startup so a fresh server answers real lookups

use crate::breach::NewBreach;
use crate::data_type::DataType;
use crate::prefix::NewPasswordPrefix;
use crate::snapshot::{SeedBatch, SeedMembership};

#[allow(clippy::too_many_arguments)]
fn breach(
    name: &str,
    domain: &str,
    breach_date: &str,
    added_date: &str,
    modified_date: &str,
    pwn_count: u64,
    description: &str,
    data_classes: &[&str],
    is_sensitive: bool,
) -> NewBreach {
    NewBreach {
        name: Some(name.to_string()),
        title: Some(name.to_string()),
        domain: Some(domain.to_string()),
        breach_date: Some(breach_date.to_string()),
        added_date: Some(added_date.to_string()),
        modified_date: Some(modified_date.to_string()),
        pwn_count: Some(pwn_count),
        description: Some(description.to_string()),
        logo_path: None,
        data_classes: Some(data_classes.iter().map(|c| c.to_string()).collect()),
        is_verified: Some(true),
        is_fabricated: Some(false),
        is_sensitive: Some(is_sensitive),
        is_retired: Some(false),
        is_spam_list: Some(false),
    }
}

fn membership(data_type: DataType, data_hash: &str, breaches: &[&str]) -> SeedMembership {
    SeedMembership {
        data_type,
        data_hash: data_hash.to_string(),
        breaches: breaches.iter().map(|b| b.to_string()).collect(),
    }
}

fn prefix(prefix: &str, entries: &[(&str, u64)]) -> NewPasswordPrefix {
    NewPasswordPrefix {
        prefix: prefix.to_string(),
        suffixes: entries.iter().map(|(s, _)| s.to_string()).collect(),
        counts: entries.iter().map(|(_, c)| *c).collect(),
    }
}

/// Four well-known breaches, a handful of email/phone digests and the
/// prefix ranges for a few common passwords.
pub fn demo_seed() -> SeedBatch {
    let breaches = vec![
        breach(
            "Adobe",
            "adobe.com",
            "2013-10",
            "2013-12-04",
            "2022-05-15",
            153_000_000,
            "In October 2013, 153 million Adobe accounts were breached with each containing an internal ID, username, email, encrypted password and a password hint in plain text.",
            &["Email addresses", "Password hints", "Passwords", "Usernames"],
            false,
        ),
        breach(
            "LinkedIn",
            "linkedin.com",
            "2012-05",
            "2016-05-21",
            "2020-12-10",
            164_611_595,
            "In May 2016, LinkedIn had 164 million email addresses and passwords exposed. Originally hacked in 2012, the data remained out of sight until being offered for sale on a dark market site 4 years later.",
            &["Email addresses", "Passwords"],
            false,
        ),
        breach(
            "MyFitnessPal",
            "myfitnesspal.com",
            "2018-02",
            "2018-03-29",
            "2019-10-04",
            143_606_147,
            "In February 2018, the diet and exercise service MyFitnessPal suffered a data breach. The incident exposed 144 million unique email addresses alongside usernames, IP addresses and passwords stored as SHA-1 and bcrypt hashes.",
            &["Email addresses", "IP addresses", "Passwords", "Usernames"],
            false,
        ),
        breach(
            "Target",
            "target.com",
            "2013-11",
            "2013-12-19",
            "2014-02-12",
            40_000_000,
            "In November 2013, Target suffered a data breach that exposed 40 million customer credit card accounts. The breach involved malware on the point-of-sale system and led to the exposure of customer names, card numbers, expiration dates, and CVV codes.",
            &["Credit cards", "Customer names", "Phone numbers"],
            true,
        ),
    ];

    let memberships = vec![
        // digest("password")
        membership(
            DataType::Email,
            "5baa61e4c9b93f3f0682250b6cf8331b7ee68fd8",
            &["Adobe", "LinkedIn"],
        ),
        // digest("test@example.com")
        membership(
            DataType::Email,
            "567159d622ffbb50b11b0efd307be358624a26ee",
            &["MyFitnessPal"],
        ),
        // digest("test")
        membership(
            DataType::Phone,
            "a94a8fe5ccb19ba61c4c0873d391e987982fbbd3",
            &["Target"],
        ),
        // digest("+15555550123")
        membership(
            DataType::Phone,
            "ac3c42d16eca973c90b9226833401d77a62076a0",
            &["Target"],
        ),
    ];

    let prefixes = vec![
        // "password"
        prefix(
            "5BAA6",
            &[
                ("1E4C9B93F3F0682250B6CF8331B7EE68FD8", 3_730_471),
                ("1E4C9B93F3F0682250B6CF8331B7EE68FD9", 5),
            ],
        ),
        // MD5("password"), kept as a non-SHA-1 range
        prefix(
            "5F4DC",
            &[
                ("C3B5AA765D61D8327DEB882CF99", 2_538_984),
                ("C3B5AA765D61D8327DEB882CF98", 12),
            ],
        ),
        // "admin"
        prefix(
            "D033E",
            &[
                ("22AE348AEB5660FC2140AEC35850C4DA997", 1_523_537),
                ("22AE348AEB5660FC2140AEC35850C4DA998", 8),
            ],
        ),
        // "12345678"
        prefix("7C222", &[("FB2927D828AF22F592134E8932480637C0D", 2_938_728)]),
    ];

    SeedBatch {
        breaches,
        memberships,
        prefixes,
    }
}
