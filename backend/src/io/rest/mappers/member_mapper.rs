//! Mapping between domain member profiles and their public DTOs.

use crate::domain::models::member::MemberProfile as DomainMember;

pub struct MemberMapper;

impl MemberMapper {
    pub fn to_dto(member: DomainMember) -> shared::MemberProfile {
        shared::MemberProfile {
            id: member.id,
            name: member.name,
            avatar_url: member.avatar_url,
        }
    }

    pub fn to_domain(member: shared::MemberProfile) -> DomainMember {
        DomainMember {
            id: member.id,
            name: member.name,
            avatar_url: member.avatar_url,
        }
    }
}
