/// Family groups screen

use iced::widget::{button, column, container, row, scrollable, text, text_input, Column};
use iced::{Alignment, Element, Length};

use crate::remote::{FamilyGroup, InviteCode, MemberRole};
use crate::state::data::UserIdentity;
use crate::Message;

use super::filled;

#[derive(Debug, Clone, Default)]
pub struct FamilyState {
    pub groups: Vec<FamilyGroup>,
    pub loading: bool,
    pub new_group_name: String,
    pub join_code: String,
    /// Email typed into the "add member" field
    pub member_email: String,
    /// Last generated invite code and the group it belongs to
    pub invite: Option<(String, InviteCode)>,
    pub message: Option<String>,
}

pub fn view<'a>(state: &'a FamilyState, user: &'a UserIdentity) -> Element<'a, Message> {
    let header = row![
        button(text("← Boards")).style(button::secondary).on_press(Message::ShowHome),
        text("Family groups").size(28),
    ]
    .spacing(16)
    .align_y(Alignment::Center);

    let create = row![
        text_input("New group name", &state.new_group_name)
            .on_input(Message::GroupNameChanged)
            .on_submit(Message::CreateGroup)
            .padding(8)
            .width(Length::Fixed(260.0)),
        button(text("Create group"))
            .on_press_maybe((!state.new_group_name.trim().is_empty()).then_some(Message::CreateGroup)),
        text_input("Invite code", &state.join_code)
            .on_input(Message::JoinCodeChanged)
            .on_submit(Message::JoinGroup)
            .padding(8)
            .width(Length::Fixed(140.0)),
        button(text("Join")).on_press_maybe((!state.join_code.is_empty()).then_some(Message::JoinGroup)),
    ]
    .spacing(8)
    .align_y(Alignment::Center);

    let mut body = column![header, create].spacing(16);

    if let Some(message) = &state.message {
        body = body.push(text(message.as_str()).size(13));
    }
    if let Some((group_name, invite)) = &state.invite {
        let expiry = invite
            .expires_at
            .as_deref()
            .map(|e| format!(" (expires {e})"))
            .unwrap_or_default();
        body = body.push(
            container(text(format!("Invite code for {group_name}: {}{expiry}", invite.code)).size(18))
                .padding(12)
                .style(filled("#f0fdf4", 8.0)),
        );
    }

    if state.loading {
        body = body.push(text("Loading groups…"));
    } else if state.groups.is_empty() {
        body = body.push(text("You are not in any family group yet."));
    } else {
        let groups = state.groups.iter().map(|group| group_card(group, user, &state.member_email));
        body = body.push(scrollable(Column::with_children(groups).spacing(12)));
    }

    body.padding(24).into()
}

fn group_card<'a>(group: &'a FamilyGroup, user: &'a UserIdentity, member_email: &'a str) -> Element<'a, Message> {
    let my_role = group.role_of(&user.id);
    let can_manage = my_role.is_some_and(MemberRole::can_manage);

    let mut members = Column::new().spacing(6);
    for member in &group.members {
        let mut line = row![
            text(member.display_name()).width(Length::Fixed(240.0)),
            text(member.role.label()).size(13).width(Length::Fixed(80.0)),
        ]
        .spacing(8)
        .align_y(Alignment::Center);

        if can_manage && member.role != MemberRole::Owner && member.user_id != user.id {
            let toggled = if member.role == MemberRole::Admin {
                MemberRole::Member
            } else {
                MemberRole::Admin
            };
            line = line.push(
                button(text(format!("Make {}", toggled.label().to_lowercase())).size(12))
                    .style(button::secondary)
                    .on_press(Message::SetMemberRole(member.id.clone(), toggled)),
            );
            line = line.push(
                button(text("Remove").size(12))
                    .style(button::danger)
                    .on_press(Message::RemoveMember(member.id.clone())),
            );
        }
        members = members.push(line);
    }

    let mut actions = row![].spacing(8).align_y(Alignment::Center);
    if can_manage {
        actions = actions.push(
            text_input("Add member by email", member_email)
                .on_input(Message::MemberEmailChanged)
                .padding(6)
                .width(Length::Fixed(220.0)),
        );
        actions = actions.push(
            button(text("Add"))
                .on_press_maybe(member_email.contains('@').then(|| Message::AddMember(group.id.clone()))),
        );
        actions = actions.push(
            button(text("Generate invite code"))
                .on_press(Message::GenerateInvite(group.id.clone(), group.name.clone())),
        );
    }
    if my_role == Some(MemberRole::Owner) {
        actions = actions.push(
            button(text("Delete group"))
                .style(button::danger)
                .on_press(Message::DeleteGroup(group.id.clone())),
        );
    }

    container(
        column![
            text(&group.name).size(20),
            members,
            actions,
        ]
        .spacing(10),
    )
    .padding(16)
    .width(Length::Fill)
    .style(filled("#ffffff", 10.0))
    .into()
}
