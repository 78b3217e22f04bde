//! /start and /help commands.

use teloxide::prelude::*;

use crate::bot::dispatcher::AppState;
use crate::bot::messenger::SendOptions;

const START_TEXT: &str = "Well done! You can use /help command to get some documentation.";

const HELP_TEXT: &str = "<b>Group Guard</b>

Add the bot to a supergroup, promote it to admin and grant it the \
'delete messages' and 'ban users' rights.

<b>Configuring</b>
/config - send in the group; the settings keyboard arrives here
/set_hello &lt;text&gt; - greeting for new members, empty text restores the default
/whitelist &lt;links&gt; - allow links, without links shows the list
/unwhitelist &lt;links&gt; - disallow links, <code>-</code> clears the list
/maxlength &lt;n&gt; - longest allowed message, 0 disables
/access - choose admins allowed to configure (owner only)

Sessions expire after a few minutes; send /config again to continue.

<b>Moderation</b>
/warn - reply to a member's message to warn them; reaching the warn limit removes them
/unwarn - reply to a member's message to clear their warnings";

/// Handle the /start command.
pub async fn start_command(msg: Message, state: AppState) -> anyhow::Result<()> {
    state
        .messenger
        .send(msg.chat.id, START_TEXT, SendOptions::default())
        .await
}

/// Handle the /help command. The help goes to the sender's private chat.
pub async fn help_command(msg: Message, state: AppState) -> anyhow::Result<()> {
    let target = msg
        .from
        .as_ref()
        .map(|u| ChatId::from(u.id))
        .unwrap_or(msg.chat.id);
    state
        .messenger
        .send(target, HELP_TEXT, SendOptions::html())
        .await
}
