//! Role-based access rules.
//!
//! Every protected resource/action pair is described by one row in
//! [`RULES`]; a request is allowed when any row matches the caller's
//! role and, for [`Scope::Owned`] rows, the record's ownership.
//! Handlers never hand-roll role checks.

use fanfund_types::Role;

use crate::middleware::Identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Influencer,
    Donor,
    Campaign,
    Donation,
    Stats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
}

/// How far a rule reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Any record of the resource.
    Any,
    /// Only records the caller owns.
    Owned,
}

/// Why a request was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No identity on the request. Maps to 401.
    Unauthenticated,
    /// Identity present but no rule matched. Maps to 403.
    Forbidden,
}

pub struct Rule {
    pub resource: Resource,
    pub action: Action,
    pub role: Role,
    pub scope: Scope,
}

/// The owners of the record a request touches. Records owned by nobody
/// in a given slot leave it `None`; donations carry both their donor
/// and the influencer whose campaign received them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ownership {
    pub donor: Option<i64>,
    pub influencer: Option<i64>,
}

impl Ownership {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn influencer(id: i64) -> Self {
        Self {
            donor: None,
            influencer: Some(id),
        }
    }

    pub fn donor(id: i64) -> Self {
        Self {
            donor: Some(id),
            influencer: None,
        }
    }

    pub fn donation(donor: i64, influencer: i64) -> Self {
        Self {
            donor: Some(donor),
            influencer: Some(influencer),
        }
    }
}

const fn rule(resource: Resource, action: Action, role: Role, scope: Scope) -> Rule {
    Rule {
        resource,
        action,
        role,
        scope,
    }
}

use Action::{Create, Delete, Update, View};
use Resource::{Campaign, Donation, Donor, Influencer, Stats};
use Scope::{Any, Owned};

pub static RULES: &[Rule] = &[
    rule(Influencer, View, Role::Admin, Any),
    rule(Influencer, View, Role::Influencer, Owned),
    rule(Influencer, Update, Role::Admin, Any),
    rule(Influencer, Update, Role::Influencer, Owned),
    rule(Influencer, Delete, Role::Admin, Any),
    rule(Donor, View, Role::Admin, Any),
    rule(Donor, View, Role::Donor, Owned),
    rule(Donor, Update, Role::Admin, Any),
    rule(Donor, Update, Role::Donor, Owned),
    rule(Donor, Delete, Role::Admin, Any),
    rule(Campaign, Create, Role::Admin, Any),
    rule(Campaign, Create, Role::Influencer, Owned),
    rule(Campaign, Update, Role::Admin, Any),
    rule(Campaign, Update, Role::Influencer, Owned),
    rule(Campaign, Delete, Role::Admin, Any),
    rule(Campaign, Delete, Role::Influencer, Owned),
    rule(Donation, Create, Role::Admin, Any),
    rule(Donation, Create, Role::Donor, Owned),
    rule(Donation, View, Role::Admin, Any),
    rule(Donation, View, Role::Donor, Owned),
    rule(Donation, View, Role::Influencer, Owned),
    rule(Donation, Delete, Role::Admin, Any),
    rule(Stats, View, Role::Admin, Any),
];

/// Checks the rule table for the given caller and record.
pub fn evaluate(
    identity: Option<&Identity>,
    resource: Resource,
    action: Action,
    ownership: Ownership,
) -> Result<(), Denial> {
    let Some(identity) = identity else {
        return Err(Denial::Unauthenticated);
    };

    let allowed = RULES.iter().any(|rule| {
        rule.resource == resource
            && rule.action == action
            && rule.role == identity.role
            && match rule.scope {
                Scope::Any => true,
                Scope::Owned => owns(identity, &ownership),
            }
    });

    if allowed { Ok(()) } else { Err(Denial::Forbidden) }
}

/// Whether the caller sits in the ownership slot matching their role.
fn owns(identity: &Identity, ownership: &Ownership) -> bool {
    match identity.role {
        Role::Admin => true,
        Role::Influencer => ownership.influencer == Some(identity.subject),
        Role::Donor => ownership.donor == Some(identity.subject),
    }
}

/// Which donation rows a caller may list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DonationVisibility {
    All,
    /// Donations made by this donor.
    OwnDonations(i64),
    /// Donations to campaigns owned by this influencer.
    OwnCampaigns(i64),
}

pub fn donation_visibility(identity: &Identity) -> DonationVisibility {
    match identity.role {
        Role::Admin => DonationVisibility::All,
        Role::Donor => DonationVisibility::OwnDonations(identity.subject),
        Role::Influencer => DonationVisibility::OwnCampaigns(identity.subject),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Identity {
        Identity {
            role: Role::Admin,
            subject: 0,
        }
    }

    fn influencer(id: i64) -> Identity {
        Identity {
            role: Role::Influencer,
            subject: id,
        }
    }

    fn donor(id: i64) -> Identity {
        Identity {
            role: Role::Donor,
            subject: id,
        }
    }

    #[test]
    fn anonymous_callers_are_unauthenticated() {
        for (resource, action) in [
            (Influencer, Update),
            (Campaign, Create),
            (Donation, View),
            (Stats, View),
        ] {
            assert_eq!(
                evaluate(None, resource, action, Ownership::none()),
                Err(Denial::Unauthenticated)
            );
        }
    }

    #[test]
    fn admins_pass_every_rule_without_ownership() {
        for rule in RULES {
            assert_eq!(
                evaluate(Some(&admin()), rule.resource, rule.action, Ownership::none()),
                Ok(())
            );
        }
    }

    #[test]
    fn influencers_reach_only_their_own_records() {
        let me = influencer(5);

        assert_eq!(
            evaluate(Some(&me), Influencer, Update, Ownership::influencer(5)),
            Ok(())
        );
        assert_eq!(
            evaluate(Some(&me), Influencer, Update, Ownership::influencer(6)),
            Err(Denial::Forbidden)
        );
        assert_eq!(
            evaluate(Some(&me), Influencer, Delete, Ownership::influencer(5)),
            Err(Denial::Forbidden)
        );

        assert_eq!(
            evaluate(Some(&me), Campaign, Create, Ownership::influencer(5)),
            Ok(())
        );
        assert_eq!(
            evaluate(Some(&me), Campaign, Update, Ownership::influencer(6)),
            Err(Denial::Forbidden)
        );
        assert_eq!(
            evaluate(Some(&me), Campaign, Delete, Ownership::influencer(5)),
            Ok(())
        );

        assert_eq!(
            evaluate(Some(&me), Donation, View, Ownership::donation(9, 5)),
            Ok(())
        );
        assert_eq!(
            evaluate(Some(&me), Donation, Create, Ownership::donation(9, 5)),
            Err(Denial::Forbidden)
        );
        assert_eq!(
            evaluate(Some(&me), Stats, View, Ownership::none()),
            Err(Denial::Forbidden)
        );
    }

    #[test]
    fn donors_reach_only_their_own_records() {
        let me = donor(9);

        assert_eq!(
            evaluate(Some(&me), Donor, View, Ownership::donor(9)),
            Ok(())
        );
        assert_eq!(
            evaluate(Some(&me), Donor, Update, Ownership::donor(10)),
            Err(Denial::Forbidden)
        );
        assert_eq!(
            evaluate(Some(&me), Donor, Delete, Ownership::donor(9)),
            Err(Denial::Forbidden)
        );

        assert_eq!(
            evaluate(Some(&me), Donation, Create, Ownership::donation(9, 5)),
            Ok(())
        );
        assert_eq!(
            evaluate(Some(&me), Donation, Create, Ownership::donation(10, 5)),
            Err(Denial::Forbidden)
        );
        assert_eq!(
            evaluate(Some(&me), Donation, View, Ownership::donation(9, 5)),
            Ok(())
        );
        assert_eq!(
            evaluate(Some(&me), Donation, Delete, Ownership::donation(9, 5)),
            Err(Denial::Forbidden)
        );

        assert_eq!(
            evaluate(Some(&me), Campaign, Update, Ownership::influencer(9)),
            Err(Denial::Forbidden)
        );
        assert_eq!(
            evaluate(Some(&me), Stats, View, Ownership::none()),
            Err(Denial::Forbidden)
        );
    }

    #[test]
    fn ownership_slots_are_role_specific() {
        // A donor whose id collides with an influencer slot gains nothing.
        assert_eq!(
            evaluate(Some(&donor(5)), Influencer, Update, Ownership::influencer(5)),
            Err(Denial::Forbidden)
        );
        assert_eq!(
            evaluate(Some(&influencer(9)), Donor, Update, Ownership::donor(9)),
            Err(Denial::Forbidden)
        );
    }

    #[test]
    fn visibility_follows_role() {
        assert_eq!(donation_visibility(&admin()), DonationVisibility::All);
        assert_eq!(
            donation_visibility(&donor(9)),
            DonationVisibility::OwnDonations(9)
        );
        assert_eq!(
            donation_visibility(&influencer(5)),
            DonationVisibility::OwnCampaigns(5)
        );
    }
}
